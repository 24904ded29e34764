//! Outbound email for Clubdesk
//!
//! A single [`EmailService`] trait with two transports: AWS SES for real
//! deployments and an in-memory mock that records messages for tests and
//! local development. The factory picks the transport from configuration.

pub mod config;
pub mod content;
pub mod mock;
pub mod ses;

use async_trait::async_trait;

pub use config::{EmailConfig, EmailProvider};
pub use mock::MockEmailService;
pub use ses::SesEmailService;

/// Errors from the email layer.
#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    #[error("Email configuration error: {0}")]
    Configuration(String),

    #[error("Failed to send email: {0}")]
    Send(String),
}

/// A fully composed outbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub body_text: String,
    pub body_html: Option<String>,
}

impl EmailMessage {
    pub fn new(to: impl Into<String>, subject: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            subject: subject.into(),
            body_text: String::new(),
            body_html: None,
        }
    }

    pub fn text(mut self, body: impl Into<String>) -> Self {
        self.body_text = body.into();
        self
    }

    pub fn html(mut self, body: impl Into<String>) -> Self {
        self.body_html = Some(body.into());
        self
    }
}

/// Transport-agnostic email sender.
#[async_trait]
pub trait EmailService: Send + Sync {
    async fn send(&self, message: EmailMessage) -> Result<(), EmailError>;
}

/// Build the configured transport.
pub async fn create_email_service(
    config: &EmailConfig,
) -> Result<std::sync::Arc<dyn EmailService>, EmailError> {
    match config.provider {
        EmailProvider::Ses => {
            let service = SesEmailService::new(config.from_address.clone()).await;
            Ok(std::sync::Arc::new(service))
        }
        EmailProvider::Mock => Ok(std::sync::Arc::new(MockEmailService::default())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_builder() {
        let msg = EmailMessage::new("player@club.example", "Welcome")
            .text("Hello")
            .html("<p>Hello</p>");
        assert_eq!(msg.to, "player@club.example");
        assert_eq!(msg.subject, "Welcome");
        assert_eq!(msg.body_text, "Hello");
        assert_eq!(msg.body_html.as_deref(), Some("<p>Hello</p>"));
    }
}
