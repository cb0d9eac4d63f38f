use uuid::Uuid;

/// One record per registered email.
///
/// OTP fields live inline on the record: an empty code with a zero expiry
/// means no pending challenge, and a non-empty code past its expiry is
/// rejected lazily on use rather than swept in the background. The
/// verification and reset channels are independent; touching one never
/// changes the other.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    /// Argon2id PHC string; plaintext passwords are never stored.
    pub password_hash: String,
    pub is_account_verified: bool,
    pub verify_otp: String,
    /// Unix seconds; 0 = no pending challenge.
    pub verify_otp_expires_at: i64,
    pub reset_otp: String,
    pub reset_otp_expires_at: i64,
}

impl User {
    /// Fresh record as created at registration: unverified, no pending codes.
    #[must_use]
    pub fn new(name: String, email: String, password_hash: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            email,
            password_hash,
            is_account_verified: false,
            verify_otp: String::new(),
            verify_otp_expires_at: 0,
            reset_otp: String::new(),
            reset_otp_expires_at: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_user_starts_unverified_with_no_challenges() {
        let user = User::new(
            "Ann".to_string(),
            "ann@x.com".to_string(),
            "$argon2id$stub".to_string(),
        );
        assert!(!user.is_account_verified);
        assert!(user.verify_otp.is_empty());
        assert_eq!(user.verify_otp_expires_at, 0);
        assert!(user.reset_otp.is_empty());
        assert_eq!(user.reset_otp_expires_at, 0);
        assert!(!user.id.is_nil());
    }
}
