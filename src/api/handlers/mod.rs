//! Route handlers.
//!
//! `auth` holds the session/OTP endpoints, `users` the authenticated profile
//! read, `health` the readiness probe, and `root` the banner.

pub mod auth;
pub mod health;
pub mod root;
pub mod users;
