//! Outbound email abstraction.

use async_trait::async_trait;
use tracing::info;

/// A rendered message ready for delivery.
#[derive(Debug, Clone)]
pub struct EmailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Delivery transport. Sends are awaited within the request that triggers
/// them, so a transport failure fails the operation.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> anyhow::Result<()>;
}

/// Logs messages instead of delivering them. Stands in for a real transport
/// in development; OTP bodies land in the service logs.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: &EmailMessage) -> anyhow::Result<()> {
        info!(
            from = %message.from,
            to = %message.to,
            subject = %message.subject,
            body = %message.body,
            "email (log transport)"
        );
        Ok(())
    }
}
