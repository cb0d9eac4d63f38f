//! Auth configuration and shared request state.

use crate::account::AccountService;
use secrecy::SecretString;
use std::sync::Arc;

const DEFAULT_SESSION_TTL_SECONDS: i64 = 7 * 24 * 60 * 60;
const DEFAULT_VERIFY_OTP_TTL_SECONDS: i64 = 24 * 60 * 60;
const DEFAULT_RESET_OTP_TTL_SECONDS: i64 = 15 * 60;

#[derive(Clone)]
pub struct AuthConfig {
    token_secret: SecretString,
    frontend_base_url: String,
    production: bool,
    sender_email: String,
    session_ttl_seconds: i64,
    verify_otp_ttl_seconds: i64,
    reset_otp_ttl_seconds: i64,
}

impl AuthConfig {
    #[must_use]
    pub fn new(token_secret: SecretString, frontend_base_url: String) -> Self {
        Self {
            token_secret,
            frontend_base_url,
            production: false,
            sender_email: "no-reply@sesamo.dev".to_string(),
            session_ttl_seconds: DEFAULT_SESSION_TTL_SECONDS,
            verify_otp_ttl_seconds: DEFAULT_VERIFY_OTP_TTL_SECONDS,
            reset_otp_ttl_seconds: DEFAULT_RESET_OTP_TTL_SECONDS,
        }
    }

    #[must_use]
    pub fn with_production(mut self, production: bool) -> Self {
        self.production = production;
        self
    }

    #[must_use]
    pub fn with_sender_email(mut self, sender_email: String) -> Self {
        self.sender_email = sender_email;
        self
    }

    #[must_use]
    pub fn with_session_ttl_seconds(mut self, seconds: i64) -> Self {
        self.session_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_verify_otp_ttl_seconds(mut self, seconds: i64) -> Self {
        self.verify_otp_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_reset_otp_ttl_seconds(mut self, seconds: i64) -> Self {
        self.reset_otp_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn token_secret(&self) -> &SecretString {
        &self.token_secret
    }

    pub(crate) fn frontend_base_url(&self) -> &str {
        &self.frontend_base_url
    }

    #[must_use]
    pub fn sender_email(&self) -> &str {
        &self.sender_email
    }

    #[must_use]
    pub fn session_ttl_seconds(&self) -> i64 {
        self.session_ttl_seconds
    }

    #[must_use]
    pub fn verify_otp_ttl_seconds(&self) -> i64 {
        self.verify_otp_ttl_seconds
    }

    #[must_use]
    pub fn reset_otp_ttl_seconds(&self) -> i64 {
        self.reset_otp_ttl_seconds
    }

    /// Only mark cookies `Secure` when serving production traffic over HTTPS.
    pub(super) fn cookie_secure(&self) -> bool {
        self.production
    }

    /// `None` in production (frontend and API live on different origins),
    /// `Strict` in development.
    pub(super) fn cookie_same_site(&self) -> &'static str {
        if self.production { "None" } else { "Strict" }
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("token_secret", &"[REDACTED]")
            .field("frontend_base_url", &self.frontend_base_url)
            .field("production", &self.production)
            .field("sender_email", &self.sender_email)
            .field("session_ttl_seconds", &self.session_ttl_seconds)
            .field("verify_otp_ttl_seconds", &self.verify_otp_ttl_seconds)
            .field("reset_otp_ttl_seconds", &self.reset_otp_ttl_seconds)
            .finish()
    }
}

/// Shared state attached to every auth route via `Extension`.
#[derive(Debug)]
pub struct AuthState {
    config: AuthConfig,
    service: Arc<AccountService>,
}

impl AuthState {
    #[must_use]
    pub fn new(config: AuthConfig, service: Arc<AccountService>) -> Self {
        Self { config, service }
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    #[must_use]
    pub fn service(&self) -> &AccountService {
        &self.service
    }
}
