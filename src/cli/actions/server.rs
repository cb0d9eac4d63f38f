use crate::{
    account::mailer::LogMailer,
    api,
    api::handlers::auth::AuthConfig,
    cli::commands::auth,
};
use anyhow::Result;
use std::sync::Arc;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: String,
    pub auth: auth::Options,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the database is unreachable or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let auth_config = AuthConfig::new(args.auth.token_secret, args.auth.frontend_base_url)
        .with_production(args.auth.production)
        .with_sender_email(args.auth.sender_email)
        .with_session_ttl_seconds(args.auth.session_ttl_seconds)
        .with_verify_otp_ttl_seconds(args.auth.verify_otp_ttl_seconds)
        .with_reset_otp_ttl_seconds(args.auth.reset_otp_ttl_seconds);

    // The log mailer stands in for a real transport; delivery is awaited
    // within the triggering request either way.
    let mailer = Arc::new(LogMailer);

    api::new(args.port, args.dsn, auth_config, mailer).await
}
