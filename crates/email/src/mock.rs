//! In-memory email transport for tests and local development

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::{EmailError, EmailMessage, EmailService};

/// Records every message instead of sending it.
#[derive(Debug, Clone, Default)]
pub struct MockEmailService {
    sent: Arc<Mutex<Vec<EmailMessage>>>,
}

impl MockEmailService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages sent so far, oldest first.
    pub fn sent_messages(&self) -> Vec<EmailMessage> {
        self.sent.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl EmailService for MockEmailService {
    async fn send(&self, message: EmailMessage) -> Result<(), EmailError> {
        tracing::info!(to = %message.to, subject = %message.subject, "mock email sent");
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(message);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_records_messages() {
        let mock = MockEmailService::new();
        mock.send(EmailMessage::new("a@club.example", "First").text("1"))
            .await
            .unwrap();
        mock.send(EmailMessage::new("b@club.example", "Second").text("2"))
            .await
            .unwrap();

        let sent = mock.sent_messages();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].to, "a@club.example");
        assert_eq!(sent[1].subject, "Second");
    }
}
