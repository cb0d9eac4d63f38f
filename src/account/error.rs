//! Domain error taxonomy with user-facing messages.

use super::store::StoreError;
use thiserror::Error;

/// Errors produced by account operations.
///
/// Every variant carries the message shown to the caller; handlers convert
/// these into `{success:false, message}` bodies and never into non-200
/// statuses.
#[derive(Debug, Error)]
pub enum Error {
    /// A required input field is missing or malformed.
    #[error("{0}")]
    Validation(&'static str),
    /// Registration attempted with an email that already has an account.
    #[error("User already exists")]
    Conflict,
    #[error("User not found")]
    NotFound,
    /// Login with an email that has no account.
    #[error("Invalid Email")]
    InvalidEmail,
    #[error("Invalid Password")]
    InvalidPassword,
    /// Missing, invalid, or expired session token.
    #[error("Not authorized. Login again.")]
    NotAuthorized,
    /// Submitted code is empty, mismatched, or there is no pending challenge.
    #[error("Invalid OTP")]
    InvalidOtp,
    /// Submitted code matched but its validity window has passed.
    #[error("OTP expired")]
    OtpExpired,
    /// Store or notifier failure surfaced at the operation boundary.
    #[error("{0}")]
    Dependency(String),
}

impl Error {
    pub(crate) fn dependency(err: impl std::fmt::Display) -> Self {
        Self::Dependency(err.to_string())
    }
}

impl From<StoreError> for Error {
    fn from(err: StoreError) -> Self {
        match err {
            // A lost duplicate-insert race reports the same conflict as the
            // up-front existence check.
            StoreError::DuplicateEmail => Self::Conflict,
            StoreError::Backend(err) => Self::Dependency(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_match_api_contract() {
        assert_eq!(Error::Conflict.to_string(), "User already exists");
        assert_eq!(Error::NotFound.to_string(), "User not found");
        assert_eq!(Error::InvalidEmail.to_string(), "Invalid Email");
        assert_eq!(Error::InvalidPassword.to_string(), "Invalid Password");
        assert_eq!(
            Error::NotAuthorized.to_string(),
            "Not authorized. Login again."
        );
        assert_eq!(Error::InvalidOtp.to_string(), "Invalid OTP");
        assert_eq!(Error::OtpExpired.to_string(), "OTP expired");
    }

    #[test]
    fn duplicate_email_store_error_maps_to_conflict() {
        let err = Error::from(StoreError::DuplicateEmail);
        assert!(matches!(err, Error::Conflict));
    }

    #[test]
    fn backend_store_error_keeps_description() {
        let err = Error::from(StoreError::Backend(anyhow::anyhow!("connection reset")));
        assert_eq!(err.to_string(), "connection reset");
    }
}
