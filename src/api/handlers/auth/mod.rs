//! Cookie-session auth: registration, login, email verification, password
//! reset.
//!
//! All routes answer HTTP 200 with a `{success, message}` envelope; failures
//! are reported in the body, never as 4xx/5xx statuses.

pub(crate) mod account;
pub(crate) mod reset;
pub(crate) mod session;
mod state;
pub(crate) mod types;
pub(crate) mod verification;

pub use state::{AuthConfig, AuthState};
