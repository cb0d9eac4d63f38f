//! Account operations: registration, login, verification, password reset.
//!
//! Every method returns a domain [`Error`] whose `Display` is the exact
//! message the API reports. OTP checks are ordered match-first: a wrong code
//! reports `Invalid OTP` even when the stored challenge has also expired.

use super::{
    error::Error,
    mailer::{EmailMessage, Mailer},
    now_unix, otp, password,
    store::UserStore,
    token::TokenIssuer,
};
use regex::Regex;
use std::sync::{Arc, OnceLock};
use tracing::{error, info};
use uuid::Uuid;

/// Outcome of a verification-OTP request for an account that may already be
/// verified.
#[derive(Debug, PartialEq, Eq)]
pub enum VerifyOtpOutcome {
    AlreadyVerified,
    Sent,
}

/// Profile subset exposed to authenticated callers.
#[derive(Debug, Clone)]
pub struct UserData {
    pub name: String,
    pub is_account_verified: bool,
}

pub struct AccountService {
    store: Arc<dyn UserStore>,
    mailer: Arc<dyn Mailer>,
    tokens: TokenIssuer,
    sender_email: String,
    verify_otp_ttl_seconds: i64,
    reset_otp_ttl_seconds: i64,
}

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap_or_else(|_| unreachable!())
    })
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl AccountService {
    pub fn new(
        store: Arc<dyn UserStore>,
        mailer: Arc<dyn Mailer>,
        tokens: TokenIssuer,
        sender_email: String,
        verify_otp_ttl_seconds: i64,
        reset_otp_ttl_seconds: i64,
    ) -> Self {
        Self {
            store,
            mailer,
            tokens,
            sender_email,
            verify_otp_ttl_seconds,
            reset_otp_ttl_seconds,
        }
    }

    /// Create an account and return a fresh session token.
    ///
    /// The welcome email is awaited; a delivery failure fails the whole call
    /// even though the record is already committed.
    ///
    /// # Errors
    /// `Validation` for missing or malformed input, `Conflict` when the email
    /// already has an account, `Dependency` on store or mail failure.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        plaintext_password: &str,
    ) -> Result<String, Error> {
        let name = name.trim();
        let email = normalize_email(email);
        if name.is_empty() || email.is_empty() || plaintext_password.is_empty() {
            return Err(Error::Validation("Missing details"));
        }
        if !email_pattern().is_match(&email) {
            return Err(Error::Validation("Invalid email address"));
        }

        if self.store.find_by_email(&email).await?.is_some() {
            return Err(Error::Conflict);
        }

        let hash = password::hash(plaintext_password).map_err(Error::dependency)?;
        let user = super::models::User::new(name.to_string(), email.clone(), hash);
        self.store.create(&user).await?;

        let token = self.tokens.issue(user.id).map_err(Error::dependency)?;

        let message = EmailMessage {
            from: self.sender_email.clone(),
            to: email.clone(),
            subject: "Welcome".to_string(),
            body: format!("Welcome! Your account has been created with email: {email}"),
        };
        if let Err(err) = self.mailer.send(&message).await {
            error!("Failed to send welcome email: {}", err);
            return Err(Error::dependency(err));
        }

        info!(user_id = %user.id, "account registered");
        Ok(token)
    }

    /// Authenticate and return a fresh session token.
    ///
    /// # Errors
    /// `Validation` when a field is missing, `InvalidEmail` for an unknown
    /// account, `InvalidPassword` on mismatch.
    pub async fn login(&self, email: &str, plaintext_password: &str) -> Result<String, Error> {
        let email = normalize_email(email);
        if email.is_empty() || plaintext_password.is_empty() {
            return Err(Error::Validation("Email and password required"));
        }

        let user = self
            .store
            .find_by_email(&email)
            .await?
            .ok_or(Error::InvalidEmail)?;

        if !password::verify(plaintext_password, &user.password_hash) {
            return Err(Error::InvalidPassword);
        }

        self.tokens.issue(user.id).map_err(Error::dependency)
    }

    /// Validate a session token, returning the user id it was issued for.
    #[must_use]
    pub fn verify_token(&self, token: &str) -> Option<Uuid> {
        self.tokens.verify(token)
    }

    /// Generate and email a verification code, unless already verified.
    ///
    /// # Errors
    /// `NotFound` for a stale session whose user no longer exists,
    /// `Dependency` on store or mail failure.
    pub async fn send_verify_otp(&self, user_id: Uuid) -> Result<VerifyOtpOutcome, Error> {
        let user = self.store.find_by_id(user_id).await?.ok_or(Error::NotFound)?;
        if user.is_account_verified {
            return Ok(VerifyOtpOutcome::AlreadyVerified);
        }

        let code = otp::generate();
        let expires_at = now_unix() + self.verify_otp_ttl_seconds;
        self.store
            .set_verify_challenge(user.id, &code, expires_at)
            .await?;

        let hours = self.verify_otp_ttl_seconds / 3600;
        let message = EmailMessage {
            from: self.sender_email.clone(),
            to: user.email.clone(),
            subject: "Account Verification OTP".to_string(),
            body: format!(
                "Your OTP is {code}. Verify your account using this OTP within {hours} hours."
            ),
        };
        self.mailer.send(&message).await.map_err(|err| {
            error!("Failed to send verification email: {}", err);
            Error::dependency(err)
        })?;

        Ok(VerifyOtpOutcome::Sent)
    }

    /// Confirm a verification code and mark the account verified.
    ///
    /// # Errors
    /// `Validation` when the code is empty, `NotFound` for a missing user,
    /// `InvalidOtp` on mismatch or no pending challenge, `OtpExpired` when
    /// the code matched but its window has passed.
    pub async fn verify_email(&self, user_id: Uuid, submitted_otp: &str) -> Result<(), Error> {
        if submitted_otp.is_empty() {
            return Err(Error::Validation("Missing details"));
        }

        let user = self.store.find_by_id(user_id).await?.ok_or(Error::NotFound)?;
        if user.verify_otp.is_empty() || user.verify_otp != submitted_otp {
            return Err(Error::InvalidOtp);
        }
        if user.verify_otp_expires_at < now_unix() {
            return Err(Error::OtpExpired);
        }

        self.store.mark_verified(user.id).await?;
        info!(user_id = %user.id, "email verified");
        Ok(())
    }

    /// Generate and email a password-reset code.
    ///
    /// # Errors
    /// `Validation` when the email is missing, `NotFound` for an unknown
    /// account, `Dependency` on store or mail failure.
    pub async fn send_reset_otp(&self, email: &str) -> Result<(), Error> {
        let email = normalize_email(email);
        if email.is_empty() {
            return Err(Error::Validation("Email is required"));
        }

        let user = self
            .store
            .find_by_email(&email)
            .await?
            .ok_or(Error::NotFound)?;

        let code = otp::generate();
        let expires_at = now_unix() + self.reset_otp_ttl_seconds;
        self.store
            .set_reset_challenge(user.id, &code, expires_at)
            .await?;

        let minutes = self.reset_otp_ttl_seconds / 60;
        let message = EmailMessage {
            from: self.sender_email.clone(),
            to: user.email.clone(),
            subject: "Password Reset OTP".to_string(),
            body: format!(
                "Your OTP for resetting your password is {code}. \
                 Use this OTP within {minutes} minutes."
            ),
        };
        self.mailer.send(&message).await.map_err(|err| {
            error!("Failed to send password reset email: {}", err);
            Error::dependency(err)
        })?;

        Ok(())
    }

    /// Confirm a reset code and replace the password.
    ///
    /// # Errors
    /// Same taxonomy as [`verify_email`](Self::verify_email), over the reset
    /// channel.
    pub async fn reset_password(
        &self,
        email: &str,
        submitted_otp: &str,
        new_password: &str,
    ) -> Result<(), Error> {
        let email = normalize_email(email);
        if email.is_empty() || submitted_otp.is_empty() || new_password.is_empty() {
            return Err(Error::Validation("Email, OTP and new password are required"));
        }

        let user = self
            .store
            .find_by_email(&email)
            .await?
            .ok_or(Error::NotFound)?;

        if user.reset_otp.is_empty() || user.reset_otp != submitted_otp {
            return Err(Error::InvalidOtp);
        }
        if user.reset_otp_expires_at < now_unix() {
            return Err(Error::OtpExpired);
        }

        let hash = password::hash(new_password).map_err(Error::dependency)?;
        self.store.rotate_password(user.id, &hash).await?;
        info!(user_id = %user.id, "password reset");
        Ok(())
    }

    /// Profile data for an authenticated user.
    ///
    /// # Errors
    /// `NotFound` when the session's user no longer exists.
    pub async fn user_data(&self, user_id: Uuid) -> Result<UserData, Error> {
        let user = self.store.find_by_id(user_id).await?.ok_or(Error::NotFound)?;
        Ok(UserData {
            name: user.name,
            is_account_verified: user.is_account_verified,
        })
    }
}

impl std::fmt::Debug for AccountService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountService")
            .field("sender_email", &self.sender_email)
            .field("verify_otp_ttl_seconds", &self.verify_otp_ttl_seconds)
            .field("reset_otp_ttl_seconds", &self.reset_otp_ttl_seconds)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::mailer::test_support::{FailingMailer, RecordingMailer};
    use crate::account::store::test_support::MemoryUserStore;
    use secrecy::SecretString;

    struct Harness {
        service: AccountService,
        store: Arc<MemoryUserStore>,
        mailer: Arc<RecordingMailer>,
    }

    fn harness() -> Harness {
        let store = Arc::new(MemoryUserStore::default());
        let mailer = Arc::new(RecordingMailer::default());
        let tokens = TokenIssuer::new(&SecretString::from("test-secret"), 604_800);
        let service = AccountService::new(
            store.clone(),
            mailer.clone(),
            tokens,
            "no-reply@sesamo.dev".to_string(),
            86_400,
            900,
        );
        Harness {
            service,
            store,
            mailer,
        }
    }

    async fn register(h: &Harness, email: &str) -> Uuid {
        let token = h
            .service
            .register("Ann", email, "hunter22")
            .await
            .expect("register");
        h.service.verify_token(&token).expect("token carries id")
    }

    #[tokio::test]
    async fn register_returns_valid_session_token_and_sends_welcome() {
        let h = harness();
        let id = register(&h, "ann@example.com").await;
        let stored = h.store.get(id).await.expect("persisted");
        assert_eq!(stored.email, "ann@example.com");
        assert!(!stored.is_account_verified);
        assert_ne!(stored.password_hash, "hunter22");

        let sent = h.mailer.sent.lock().expect("mailer");
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "ann@example.com");
        assert_eq!(sent[0].from, "no-reply@sesamo.dev");
        assert_eq!(sent[0].subject, "Welcome");
    }

    #[tokio::test]
    async fn register_normalizes_email_case_and_whitespace() {
        let h = harness();
        let id = register(&h, "  Ann@Example.COM ").await;
        let stored = h.store.get(id).await.expect("persisted");
        assert_eq!(stored.email, "ann@example.com");
    }

    #[tokio::test]
    async fn register_rejects_missing_and_malformed_input() {
        let h = harness();
        let err = h.service.register("", "a@x.com", "pw").await.expect_err("name");
        assert_eq!(err.to_string(), "Missing details");
        let err = h
            .service
            .register("Ann", "not-an-email", "pw")
            .await
            .expect_err("email");
        assert_eq!(err.to_string(), "Invalid email address");
        let err = h
            .service
            .register("Ann", "a@b", "pw")
            .await
            .expect_err("no tld dot");
        assert_eq!(err.to_string(), "Invalid email address");
    }

    #[tokio::test]
    async fn register_duplicate_email_conflicts_case_insensitively() {
        let h = harness();
        register(&h, "ann@example.com").await;
        let err = h
            .service
            .register("Ann2", "ANN@EXAMPLE.COM", "pw")
            .await
            .expect_err("duplicate");
        assert_eq!(err.to_string(), "User already exists");
    }

    #[tokio::test]
    async fn register_fails_when_welcome_email_fails() {
        let store = Arc::new(MemoryUserStore::default());
        let tokens = TokenIssuer::new(&SecretString::from("test-secret"), 604_800);
        let service = AccountService::new(
            store.clone(),
            Arc::new(FailingMailer),
            tokens,
            "no-reply@sesamo.dev".to_string(),
            86_400,
            900,
        );
        let err = service
            .register("Ann", "ann@example.com", "pw")
            .await
            .expect_err("mail failure");
        assert!(matches!(err, Error::Dependency(_)));
        // The record was committed before the send; the caller sees failure
        // but the row exists.
        assert!(store
            .find_by_email("ann@example.com")
            .await
            .expect("lookup")
            .is_some());
    }

    #[tokio::test]
    async fn login_succeeds_with_correct_password() {
        let h = harness();
        let id = register(&h, "ann@example.com").await;
        let token = h
            .service
            .login("ann@example.com", "hunter22")
            .await
            .expect("login");
        assert_eq!(h.service.verify_token(&token), Some(id));
    }

    #[tokio::test]
    async fn login_distinguishes_unknown_email_from_bad_password() {
        let h = harness();
        register(&h, "ann@example.com").await;
        let err = h
            .service
            .login("bob@example.com", "hunter22")
            .await
            .expect_err("unknown email");
        assert_eq!(err.to_string(), "Invalid Email");
        let err = h
            .service
            .login("ann@example.com", "wrong")
            .await
            .expect_err("bad password");
        assert_eq!(err.to_string(), "Invalid Password");
        let err = h.service.login("", "pw").await.expect_err("missing email");
        assert_eq!(err.to_string(), "Email and password required");
    }

    #[tokio::test]
    async fn verify_otp_flow_marks_account_verified() {
        let h = harness();
        let id = register(&h, "ann@example.com").await;
        let outcome = h.service.send_verify_otp(id).await.expect("send");
        assert_eq!(outcome, VerifyOtpOutcome::Sent);

        let stored = h.store.get(id).await.expect("present");
        assert_eq!(stored.verify_otp.len(), 6);
        assert!(stored.verify_otp_expires_at > now_unix() + 86_000);

        let sent = h.mailer.sent.lock().expect("mailer");
        let otp_mail = sent.last().expect("otp mail");
        assert_eq!(otp_mail.subject, "Account Verification OTP");
        assert!(otp_mail.body.contains(&stored.verify_otp));
        assert!(otp_mail.body.contains("24 hours"));
        drop(sent);

        h.service
            .verify_email(id, &stored.verify_otp)
            .await
            .expect("verify");
        let stored = h.store.get(id).await.expect("present");
        assert!(stored.is_account_verified);
        assert!(stored.verify_otp.is_empty());
        assert_eq!(stored.verify_otp_expires_at, 0);
    }

    #[tokio::test]
    async fn send_verify_otp_short_circuits_when_already_verified() {
        let h = harness();
        let id = register(&h, "ann@example.com").await;
        h.service.send_verify_otp(id).await.expect("send");
        let code = h.store.get(id).await.expect("present").verify_otp;
        h.service.verify_email(id, &code).await.expect("verify");

        let mails_before = h.mailer.sent.lock().expect("mailer").len();
        let outcome = h.service.send_verify_otp(id).await.expect("resend");
        assert_eq!(outcome, VerifyOtpOutcome::AlreadyVerified);
        assert_eq!(h.mailer.sent.lock().expect("mailer").len(), mails_before);
    }

    #[tokio::test]
    async fn verify_email_rejects_wrong_empty_and_expired_codes() {
        let h = harness();
        let id = register(&h, "ann@example.com").await;

        // No pending challenge at all.
        let err = h.service.verify_email(id, "123456").await.expect_err("none");
        assert_eq!(err.to_string(), "Invalid OTP");

        h.service.send_verify_otp(id).await.expect("send");
        let err = h.service.verify_email(id, "").await.expect_err("empty");
        assert_eq!(err.to_string(), "Missing details");

        let code = h.store.get(id).await.expect("present").verify_otp;
        let wrong = if code == "123456" { "654321" } else { "123456" };
        let err = h.service.verify_email(id, wrong).await.expect_err("wrong");
        assert_eq!(err.to_string(), "Invalid OTP");

        // Expired: correct code, window in the past.
        h.store
            .set_verify_challenge(id, &code, now_unix() - 1)
            .await
            .expect("age challenge");
        let err = h.service.verify_email(id, &code).await.expect_err("expired");
        assert_eq!(err.to_string(), "OTP expired");

        // Wrong code on an expired challenge still reports the mismatch.
        let err = h
            .service
            .verify_email(id, wrong)
            .await
            .expect_err("wrong beats expired");
        assert_eq!(err.to_string(), "Invalid OTP");
    }

    #[tokio::test]
    async fn reset_password_flow_rotates_the_hash() {
        let h = harness();
        let id = register(&h, "ann@example.com").await;
        h.service
            .send_reset_otp("ann@example.com")
            .await
            .expect("send");

        let stored = h.store.get(id).await.expect("present");
        assert_eq!(stored.reset_otp.len(), 6);
        assert!(stored.reset_otp_expires_at <= now_unix() + 900);

        let sent = h.mailer.sent.lock().expect("mailer");
        let reset_mail = sent.last().expect("reset mail");
        assert_eq!(reset_mail.subject, "Password Reset OTP");
        assert!(reset_mail.body.contains("15 minutes"));
        drop(sent);

        h.service
            .reset_password("ann@example.com", &stored.reset_otp, "new-password")
            .await
            .expect("reset");

        h.service
            .login("ann@example.com", "new-password")
            .await
            .expect("new password works");
        let err = h
            .service
            .login("ann@example.com", "hunter22")
            .await
            .expect_err("old password dead");
        assert_eq!(err.to_string(), "Invalid Password");

        // Challenge consumed: the same code cannot be replayed.
        let err = h
            .service
            .reset_password("ann@example.com", &stored.reset_otp, "another")
            .await
            .expect_err("replay");
        assert_eq!(err.to_string(), "Invalid OTP");
    }

    #[tokio::test]
    async fn reset_password_rejects_wrong_and_expired_codes() {
        let h = harness();
        let id = register(&h, "ann@example.com").await;

        let err = h
            .service
            .reset_password("ann@example.com", "123456", "np")
            .await
            .expect_err("no challenge");
        assert_eq!(err.to_string(), "Invalid OTP");

        h.service
            .send_reset_otp("ann@example.com")
            .await
            .expect("send");
        let code = h.store.get(id).await.expect("present").reset_otp;
        let wrong = if code == "123456" { "654321" } else { "123456" };
        let err = h
            .service
            .reset_password("ann@example.com", wrong, "np")
            .await
            .expect_err("wrong");
        assert_eq!(err.to_string(), "Invalid OTP");

        h.store
            .set_reset_challenge(id, &code, now_unix() - 1)
            .await
            .expect("age challenge");
        let err = h
            .service
            .reset_password("ann@example.com", &code, "np")
            .await
            .expect_err("expired");
        assert_eq!(err.to_string(), "OTP expired");

        let err = h
            .service
            .reset_password("", "123456", "np")
            .await
            .expect_err("missing email");
        assert_eq!(err.to_string(), "Email, OTP and new password are required");
    }

    #[tokio::test]
    async fn send_reset_otp_requires_a_known_account() {
        let h = harness();
        let err = h
            .service
            .send_reset_otp("ghost@example.com")
            .await
            .expect_err("unknown");
        assert_eq!(err.to_string(), "User not found");
        let err = h.service.send_reset_otp("").await.expect_err("missing");
        assert_eq!(err.to_string(), "Email is required");
    }

    #[tokio::test]
    async fn user_data_returns_name_and_verification_state() {
        let h = harness();
        let id = register(&h, "ann@example.com").await;
        let data = h.service.user_data(id).await.expect("data");
        assert_eq!(data.name, "Ann");
        assert!(!data.is_account_verified);

        let err = h
            .service
            .user_data(Uuid::new_v4())
            .await
            .expect_err("unknown id");
        assert_eq!(err.to_string(), "User not found");
    }
}
