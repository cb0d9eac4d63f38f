//! # Sesamo (Account Authentication Service)
//!
//! `sesamo` is a user-account authentication service: registration, login,
//! logout, email verification via one-time passcodes (OTP), and password
//! reset via OTP, backed by a persistent user record.
//!
//! ## Sessions
//!
//! Successful registration or login issues a signed, self-contained JWT
//! carried in an `HttpOnly` cookie. Possession of a valid, unexpired token is
//! the sole authorization proof; there is no server-side revocation, so a
//! previously issued token stays valid until it expires naturally, even after
//! logout or a password reset.
//!
//! ## OTP lifecycle
//!
//! Each user record holds at most one outstanding 6-digit code per channel
//! (verification, reset). Codes are invalidated lazily: an expired code is
//! rejected when submitted, never swept in the background. Sending a new code
//! overwrites the previous one.
//!
//! ## API contract
//!
//! Every endpoint answers HTTP 200 with `{success, message?}`; failures are
//! signaled only in the body. `/health` is the one exception and reports
//! 200/503 for load balancers.

pub mod account;
pub mod api;
pub mod cli;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};
