//! AWS SES transport

use async_trait::async_trait;
use aws_sdk_ses::types::{Body, Content, Destination, Message};

use crate::{EmailError, EmailMessage, EmailService};

pub struct SesEmailService {
    client: aws_sdk_ses::Client,
    from_address: String,
}

impl SesEmailService {
    pub async fn new(from_address: String) -> Self {
        let aws_config = aws_config::load_from_env().await;
        Self {
            client: aws_sdk_ses::Client::new(&aws_config),
            from_address,
        }
    }

    fn utf8(data: &str) -> Result<Content, EmailError> {
        Content::builder()
            .data(data)
            .charset("UTF-8")
            .build()
            .map_err(|e| EmailError::Send(format!("Invalid email content: {e}")))
    }
}

#[async_trait]
impl EmailService for SesEmailService {
    async fn send(&self, message: EmailMessage) -> Result<(), EmailError> {
        let mut body = Body::builder().text(Self::utf8(&message.body_text)?);
        if let Some(html) = &message.body_html {
            body = body.html(Self::utf8(html)?);
        }

        let ses_message = Message::builder()
            .subject(Self::utf8(&message.subject)?)
            .body(body.build())
            .build();

        self.client
            .send_email()
            .source(&self.from_address)
            .destination(Destination::builder().to_addresses(&message.to).build())
            .message(ses_message)
            .send()
            .await
            .map_err(|e| EmailError::Send(e.to_string()))?;

        tracing::info!(to = %message.to, subject = %message.subject, "email sent via SES");
        Ok(())
    }
}
