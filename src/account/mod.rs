//! Account domain: user records, credential and OTP lifecycle, session tokens.
//!
//! This module is HTTP-free. The [`service::AccountService`] orchestrates the
//! store, mailer, password hasher, and token issuer; the `api` layer only
//! translates requests and errors into the JSON envelope.

pub mod error;
pub mod mailer;
pub mod models;
pub mod otp;
pub mod password;
pub mod service;
pub mod store;
pub mod token;

pub use error::Error;
pub use service::AccountService;

use std::time::SystemTime;

/// Unix seconds now; OTP expiries and token claims use this clock.
pub(crate) fn now_unix() -> i64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::now_unix;

    #[test]
    fn now_unix_is_recent() {
        // 2024-01-01 as a floor; catches accidental millisecond units too.
        let now = now_unix();
        assert!(now > 1_704_067_200);
        assert!(now < 10_000_000_000);
    }
}
