use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command};
use secrecy::SecretString;

pub const ARG_TOKEN_SECRET: &str = "token-secret";
pub const ARG_ENVIRONMENT: &str = "environment";
pub const ARG_FRONTEND_BASE_URL: &str = "frontend-base-url";
pub const ARG_SENDER_EMAIL: &str = "sender-email";
pub const ARG_SESSION_TTL_SECONDS: &str = "session-ttl-seconds";
pub const ARG_VERIFY_OTP_TTL_SECONDS: &str = "verify-otp-ttl-seconds";
pub const ARG_RESET_OTP_TTL_SECONDS: &str = "reset-otp-ttl-seconds";

pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_TOKEN_SECRET)
                .long("token-secret")
                .help("Secret used to sign and verify session tokens")
                .env("SESAMO_TOKEN_SECRET")
                .required(true),
        )
        .arg(
            Arg::new(ARG_ENVIRONMENT)
                .long("environment")
                .help("Deployment environment; controls session cookie attributes")
                .env("SESAMO_ENVIRONMENT")
                .default_value("development")
                .value_parser(["development", "production"]),
        )
        .arg(
            Arg::new(ARG_FRONTEND_BASE_URL)
                .long("frontend-base-url")
                .help("Frontend base URL allowed to send credentialed requests")
                .env("SESAMO_FRONTEND_BASE_URL")
                .default_value("http://localhost:5173"),
        )
        .arg(
            Arg::new(ARG_SENDER_EMAIL)
                .long("sender-email")
                .help("From address for outbound notification emails")
                .env("SESAMO_SENDER_EMAIL")
                .default_value("no-reply@sesamo.dev"),
        )
        .arg(
            Arg::new(ARG_SESSION_TTL_SECONDS)
                .long("session-ttl-seconds")
                .help("Session token and cookie TTL in seconds")
                .env("SESAMO_SESSION_TTL_SECONDS")
                .default_value("604800")
                .value_parser(clap::value_parser!(i64)),
        )
        .arg(
            Arg::new(ARG_VERIFY_OTP_TTL_SECONDS)
                .long("verify-otp-ttl-seconds")
                .help("Email verification OTP TTL in seconds")
                .env("SESAMO_VERIFY_OTP_TTL_SECONDS")
                .default_value("86400")
                .value_parser(clap::value_parser!(i64)),
        )
        .arg(
            Arg::new(ARG_RESET_OTP_TTL_SECONDS)
                .long("reset-otp-ttl-seconds")
                .help("Password reset OTP TTL in seconds")
                .env("SESAMO_RESET_OTP_TTL_SECONDS")
                .default_value("900")
                .value_parser(clap::value_parser!(i64)),
        )
}

/// Auth options parsed from CLI matches.
#[derive(Debug)]
pub struct Options {
    pub token_secret: SecretString,
    pub production: bool,
    pub frontend_base_url: String,
    pub sender_email: String,
    pub session_ttl_seconds: i64,
    pub verify_otp_ttl_seconds: i64,
    pub reset_otp_ttl_seconds: i64,
}

impl Options {
    /// Extract auth options from validated matches.
    ///
    /// # Errors
    /// Returns an error if a required argument is missing.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let token_secret = matches
            .get_one::<String>(ARG_TOKEN_SECRET)
            .cloned()
            .map(SecretString::from)
            .context("missing required argument: --token-secret")?;
        let environment = matches
            .get_one::<String>(ARG_ENVIRONMENT)
            .cloned()
            .unwrap_or_else(|| "development".to_string());
        let frontend_base_url = matches
            .get_one::<String>(ARG_FRONTEND_BASE_URL)
            .cloned()
            .context("missing required argument: --frontend-base-url")?;
        let sender_email = matches
            .get_one::<String>(ARG_SENDER_EMAIL)
            .cloned()
            .context("missing required argument: --sender-email")?;

        Ok(Self {
            token_secret,
            production: environment == "production",
            frontend_base_url,
            sender_email,
            session_ttl_seconds: matches
                .get_one::<i64>(ARG_SESSION_TTL_SECONDS)
                .copied()
                .unwrap_or(604_800),
            verify_otp_ttl_seconds: matches
                .get_one::<i64>(ARG_VERIFY_OTP_TTL_SECONDS)
                .copied()
                .unwrap_or(86_400),
            reset_otp_ttl_seconds: matches
                .get_one::<i64>(ARG_RESET_OTP_TTL_SECONDS)
                .copied()
                .unwrap_or(900),
        })
    }
}
