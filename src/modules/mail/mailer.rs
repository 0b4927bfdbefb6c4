use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Attachment, Mailbox, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use crate::core::config::MailConfig;
use crate::core::error::AppError;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("Invalid address '{0}'")]
    Address(String),

    #[error("Failed to build message: {0}")]
    Build(String),

    #[error("SMTP delivery failed: {0}")]
    Transport(String),
}

impl From<MailError> for AppError {
    fn from(e: MailError) -> Self {
        AppError::Mail(e.to_string())
    }
}

/// Image embedded in the HTML body and referenced as `cid:<content_id>`
#[derive(Debug, Clone)]
pub struct InlineImage {
    pub content_id: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct OutboundMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
    pub inline_image: Option<InlineImage>,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: OutboundMessage) -> Result<(), MailError>;
}

/// SMTP delivery through lettre's tokio transport
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &MailConfig, server: &str) -> Result<Self, MailError> {
        let from = parse_mailbox(&config.sender)?;

        let builder = if config.use_tls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(server)
                .map_err(|e| MailError::Transport(e.to_string()))?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(server)
        };

        // A slow server must not hold the submitting request forever
        let mut builder = builder.port(config.port).timeout(Some(config.timeout));
        if let Some((username, password)) = config.credentials() {
            builder = builder.credentials(Credentials::new(username, password));
        }

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }

    fn build_message(&self, message: OutboundMessage) -> Result<Message, MailError> {
        let builder = Message::builder()
            .from(self.from.clone())
            .to(parse_mailbox(&message.to)?)
            .subject(message.subject);

        let html = SinglePart::html(message.html);
        let result = match message.inline_image {
            Some(image) => {
                let content_type = ContentType::parse(&image.content_type)
                    .map_err(|e| MailError::Build(e.to_string()))?;
                let attachment =
                    Attachment::new_inline(image.content_id).body(image.data, content_type);
                builder.multipart(MultiPart::related().singlepart(html).singlepart(attachment))
            }
            None => builder.singlepart(html),
        };

        result.map_err(|e| MailError::Build(e.to_string()))
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, message: OutboundMessage) -> Result<(), MailError> {
        let to = message.to.clone();
        let email = self.build_message(message)?;

        self.transport
            .send(email)
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;

        info!("Notification email delivered to {}", to);
        Ok(())
    }
}

/// Mailer used when no SMTP server is configured: logs instead of sending
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: OutboundMessage) -> Result<(), MailError> {
        parse_mailbox(&message.to)?;
        info!(
            to = %message.to,
            subject = %message.subject,
            has_image = message.inline_image.is_some(),
            "MAIL_SERVER not configured, notification email logged only"
        );
        Ok(())
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, MailError> {
    address
        .parse::<Mailbox>()
        .map_err(|_| MailError::Address(address.to_string()))
}

/// Pick the transport from configuration
pub fn build_mailer(config: &MailConfig) -> Result<Arc<dyn Mailer>, MailError> {
    match &config.server {
        Some(server) => {
            info!(
                "SMTP mailer configured for {}:{} (starttls: {})",
                server, config.port, config.use_tls
            );
            Ok(Arc::new(SmtpMailer::new(config, server)?))
        }
        None => {
            tracing::warn!("MAIL_SERVER not set, notification emails will only be logged");
            Ok(Arc::new(LogMailer))
        }
    }
}
