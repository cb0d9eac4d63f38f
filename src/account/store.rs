//! User persistence.
//!
//! The trait keeps the service testable without Postgres; `PgUserStore` is
//! the production implementation. Every mutation here is a single-row UPDATE
//! keyed by id, so no transactions are needed.

use super::models::User;
use async_trait::async_trait;
use sqlx::{postgres::PgDatabaseError, PgPool};
use thiserror::Error;
use tracing::{info_span, Instrument};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Insert lost a race against another registration for the same email.
    #[error("duplicate email")]
    DuplicateEmail,
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;
    async fn create(&self, user: &User) -> Result<(), StoreError>;
    /// Set a pending verification code; overwrites any previous one.
    async fn set_verify_challenge(
        &self,
        id: Uuid,
        otp: &str,
        expires_at: i64,
    ) -> Result<(), StoreError>;
    /// Mark verified and clear the verification challenge.
    async fn mark_verified(&self, id: Uuid) -> Result<(), StoreError>;
    /// Set a pending reset code; overwrites any previous one.
    async fn set_reset_challenge(
        &self,
        id: Uuid,
        otp: &str,
        expires_at: i64,
    ) -> Result<(), StoreError>;
    /// Replace the password hash and clear the reset challenge.
    async fn rotate_password(&self, id: Uuid, password_hash: &str) -> Result<(), StoreError>;
}

#[derive(Debug, Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const USER_COLUMNS: &str = "id, name, email, password_hash, is_account_verified, \
     verify_otp, verify_otp_expires_at, reset_otp, reset_otp_expires_at";

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => {
            db_err
                .try_downcast_ref::<PgDatabaseError>()
                .map(PgDatabaseError::code)
                == Some("23505")
        }
        _ => false,
    }
}

fn backend(err: sqlx::Error) -> StoreError {
    StoreError::Backend(err.into())
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = %query
        );
        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .map_err(backend)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = %query
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .map_err(backend)
    }

    async fn create(&self, user: &User) -> Result<(), StoreError> {
        let query = "INSERT INTO users \
             (id, name, email, password_hash, is_account_verified, \
              verify_otp, verify_otp_expires_at, reset_otp, reset_otp_expires_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = query
        );
        sqlx::query(query)
            .bind(user.id)
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.is_account_verified)
            .bind(&user.verify_otp)
            .bind(user.verify_otp_expires_at)
            .bind(&user.reset_otp)
            .bind(user.reset_otp_expires_at)
            .execute(&self.pool)
            .instrument(span)
            .await
            .map(|_| ())
            .map_err(|err| {
                if is_unique_violation(&err) {
                    StoreError::DuplicateEmail
                } else {
                    backend(err)
                }
            })
    }

    async fn set_verify_challenge(
        &self,
        id: Uuid,
        otp: &str,
        expires_at: i64,
    ) -> Result<(), StoreError> {
        let query = "UPDATE users SET verify_otp = $2, verify_otp_expires_at = $3 WHERE id = $1";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "UPDATE",
            db.statement = query
        );
        sqlx::query(query)
            .bind(id)
            .bind(otp)
            .bind(expires_at)
            .execute(&self.pool)
            .instrument(span)
            .await
            .map(|_| ())
            .map_err(backend)
    }

    async fn mark_verified(&self, id: Uuid) -> Result<(), StoreError> {
        let query = "UPDATE users SET is_account_verified = TRUE, \
             verify_otp = '', verify_otp_expires_at = 0 WHERE id = $1";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "UPDATE",
            db.statement = query
        );
        sqlx::query(query)
            .bind(id)
            .execute(&self.pool)
            .instrument(span)
            .await
            .map(|_| ())
            .map_err(backend)
    }

    async fn set_reset_challenge(
        &self,
        id: Uuid,
        otp: &str,
        expires_at: i64,
    ) -> Result<(), StoreError> {
        let query = "UPDATE users SET reset_otp = $2, reset_otp_expires_at = $3 WHERE id = $1";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "UPDATE",
            db.statement = query
        );
        sqlx::query(query)
            .bind(id)
            .bind(otp)
            .bind(expires_at)
            .execute(&self.pool)
            .instrument(span)
            .await
            .map(|_| ())
            .map_err(backend)
    }

    async fn rotate_password(&self, id: Uuid, password_hash: &str) -> Result<(), StoreError> {
        let query = "UPDATE users SET password_hash = $2, \
             reset_otp = '', reset_otp_expires_at = 0 WHERE id = $1";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "UPDATE",
            db.statement = query
        );
        sqlx::query(query)
            .bind(id)
            .bind(password_hash)
            .execute(&self.pool)
            .instrument(span)
            .await
            .map(|_| ())
            .map_err(backend)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::{StoreError, User, UserStore};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use tokio::sync::Mutex;
    use uuid::Uuid;

    /// In-memory store mirroring the Postgres semantics, including the
    /// unique-email constraint.
    #[derive(Debug, Default)]
    pub struct MemoryUserStore {
        users: Mutex<HashMap<Uuid, User>>,
    }

    impl MemoryUserStore {
        /// Snapshot a record for assertions on OTP state.
        pub async fn get(&self, id: Uuid) -> Option<User> {
            self.users.lock().await.get(&id).cloned()
        }
    }

    #[async_trait]
    impl UserStore for MemoryUserStore {
        async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
            Ok(self
                .users
                .lock()
                .await
                .values()
                .find(|u| u.email == email)
                .cloned())
        }

        async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
            Ok(self.users.lock().await.get(&id).cloned())
        }

        async fn create(&self, user: &User) -> Result<(), StoreError> {
            let mut users = self.users.lock().await;
            if users.values().any(|u| u.email == user.email) {
                return Err(StoreError::DuplicateEmail);
            }
            users.insert(user.id, user.clone());
            Ok(())
        }

        async fn set_verify_challenge(
            &self,
            id: Uuid,
            otp: &str,
            expires_at: i64,
        ) -> Result<(), StoreError> {
            if let Some(user) = self.users.lock().await.get_mut(&id) {
                user.verify_otp = otp.to_string();
                user.verify_otp_expires_at = expires_at;
            }
            Ok(())
        }

        async fn mark_verified(&self, id: Uuid) -> Result<(), StoreError> {
            if let Some(user) = self.users.lock().await.get_mut(&id) {
                user.is_account_verified = true;
                user.verify_otp.clear();
                user.verify_otp_expires_at = 0;
            }
            Ok(())
        }

        async fn set_reset_challenge(
            &self,
            id: Uuid,
            otp: &str,
            expires_at: i64,
        ) -> Result<(), StoreError> {
            if let Some(user) = self.users.lock().await.get_mut(&id) {
                user.reset_otp = otp.to_string();
                user.reset_otp_expires_at = expires_at;
            }
            Ok(())
        }

        async fn rotate_password(&self, id: Uuid, password_hash: &str) -> Result<(), StoreError> {
            if let Some(user) = self.users.lock().await.get_mut(&id) {
                user.password_hash = password_hash.to_string();
                user.reset_otp.clear();
                user.reset_otp_expires_at = 0;
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::MemoryUserStore;
    use super::*;

    fn user(email: &str) -> User {
        User::new("Test".to_string(), email.to_string(), "$hash".to_string())
    }

    #[tokio::test]
    async fn create_rejects_duplicate_email() {
        let store = MemoryUserStore::default();
        store.create(&user("a@x.com")).await.expect("first insert");
        let err = store.create(&user("a@x.com")).await.expect_err("duplicate");
        assert!(matches!(err, StoreError::DuplicateEmail));
    }

    #[tokio::test]
    async fn mark_verified_clears_the_challenge() {
        let store = MemoryUserStore::default();
        let u = user("b@x.com");
        store.create(&u).await.expect("insert");
        store
            .set_verify_challenge(u.id, "123456", 9_999_999_999)
            .await
            .expect("challenge");
        store.mark_verified(u.id).await.expect("verify");
        let stored = store.get(u.id).await.expect("present");
        assert!(stored.is_account_verified);
        assert!(stored.verify_otp.is_empty());
        assert_eq!(stored.verify_otp_expires_at, 0);
    }

    #[tokio::test]
    async fn rotate_password_clears_reset_challenge_only() {
        let store = MemoryUserStore::default();
        let u = user("c@x.com");
        store.create(&u).await.expect("insert");
        store
            .set_verify_challenge(u.id, "111111", 9_999_999_999)
            .await
            .expect("verify challenge");
        store
            .set_reset_challenge(u.id, "222222", 9_999_999_999)
            .await
            .expect("reset challenge");
        store.rotate_password(u.id, "$new").await.expect("rotate");
        let stored = store.get(u.id).await.expect("present");
        assert_eq!(stored.password_hash, "$new");
        assert!(stored.reset_otp.is_empty());
        assert_eq!(stored.reset_otp_expires_at, 0);
        // Verification channel untouched.
        assert_eq!(stored.verify_otp, "111111");
    }
}
