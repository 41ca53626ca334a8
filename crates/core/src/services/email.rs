//! Outbound email.
//!
//! Delivery is fire-and-forget: callers spawn the send and never wait on it,
//! and there is no retry. When no SMTP configuration is present the service
//! degrades to a traced no-op so development setups work without a relay.

use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use critique_common::config::EmailConfig;
use critique_common::{AppError, AppResult};

/// Email service.
#[derive(Clone)]
pub struct EmailService {
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
    config: Option<EmailConfig>,
}

impl EmailService {
    /// Create a new email service.
    pub fn new(config: Option<EmailConfig>) -> AppResult<Self> {
        let transport = match &config {
            Some(cfg) => Some(build_transport(cfg)?),
            None => None,
        };

        Ok(Self { transport, config })
    }

    /// Check if email delivery is configured.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.transport.is_some()
    }

    /// Send the one-time confirmation code issued at signup.
    pub async fn send_confirmation_code(
        &self,
        to: &str,
        username: &str,
        code: &str,
    ) -> AppResult<()> {
        let (Some(transport), Some(config)) = (&self.transport, &self.config) else {
            tracing::info!(to = %to, "Email not configured, skipping confirmation code delivery");
            return Ok(());
        };

        let from = format!("{} <{}>", config.from_name, config.from_address)
            .parse()
            .map_err(|e| AppError::Email(format!("Invalid from address: {e}")))?;
        let to_mailbox = to
            .parse()
            .map_err(|e| AppError::Email(format!("Invalid recipient address: {e}")))?;

        let message = Message::builder()
            .from(from)
            .to(to_mailbox)
            .subject(format!("Hello, {username}! Confirm your email"))
            .header(ContentType::TEXT_PLAIN)
            .body(format!("Your confirmation code: {code}"))
            .map_err(|e| AppError::Email(format!("Failed to build message: {e}")))?;

        transport
            .send(message)
            .await
            .map_err(|e| AppError::Email(format!("Failed to send message: {e}")))?;

        tracing::debug!(to = %to, "Confirmation code sent");
        Ok(())
    }
}

fn build_transport(config: &EmailConfig) -> AppResult<AsyncSmtpTransport<Tokio1Executor>> {
    let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
        .map_err(|e| AppError::Email(format!("Invalid SMTP relay: {e}")))?
        .port(config.smtp_port);

    if let (Some(username), Some(password)) = (&config.smtp_username, &config.smtp_password) {
        builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
    }

    Ok(builder.build())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unconfigured_service_is_a_no_op() {
        let service = EmailService::new(None).expect("service");

        assert!(!service.is_enabled());
        assert!(
            service
                .send_confirmation_code("reader@example.com", "reader", "abc123")
                .await
                .is_ok()
        );
    }
}
