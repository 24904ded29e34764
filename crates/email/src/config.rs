//! Email configuration loaded from the environment

use std::env;

use crate::EmailError;

/// Which transport to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailProvider {
    Ses,
    /// In-memory transport; records messages, sends nothing
    Mock,
}

#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub provider: EmailProvider,

    /// From address for all outbound mail
    pub from_address: String,

    /// Base URL of the frontend, used to build invitation links
    pub frontend_url: String,
}

impl EmailConfig {
    /// Load from environment variables. Defaults to the mock transport so
    /// local development never sends real mail by accident.
    pub fn from_env() -> Result<Self, EmailError> {
        let provider = match env::var("EMAIL_PROVIDER").as_deref() {
            Ok("ses") => EmailProvider::Ses,
            Ok("mock") | Err(_) => EmailProvider::Mock,
            Ok(other) => {
                return Err(EmailError::Configuration(format!(
                    "Unknown EMAIL_PROVIDER: {other}"
                )))
            }
        };

        Ok(Self {
            provider,
            from_address: env::var("EMAIL_FROM_ADDRESS")
                .unwrap_or_else(|_| "noreply@clubdesk.example".to_string()),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
        })
    }
}
