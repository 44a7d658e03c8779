use std::sync::Arc;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;

use crate::config::{SecretManager, SmtpSettings};

/// A rendered email ready for a transport
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingMail {
    pub subject: String,
    pub html_body: String,
    pub from: String,
    pub to: Vec<String>,
}

/// Delivery failure; logged by the dispatcher and never surfaced to callers
#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("Invalid address '{address}': {message}")]
    InvalidAddress { address: String, message: String },

    #[error("Failed to build message: {0}")]
    Build(String),

    #[error("Transport {transport} failed: {message}")]
    Transport {
        transport: &'static str,
        message: String,
    },
}

/// Outbound mail boundary
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), DeliveryError>;

    fn name(&self) -> &'static str;
}

/// SMTP delivery through lettre
pub struct SmtpMailTransport {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailTransport {
    /// Authenticated relay when credentials are configured, plain connection otherwise
    pub fn new(settings: &SmtpSettings, password: Option<&str>) -> Result<Self, DeliveryError> {
        let transport = match (&settings.username, password) {
            (Some(username), Some(password)) => {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)
                    .map_err(|e| DeliveryError::Transport {
                        transport: "smtp",
                        message: format!("SMTP relay error: {}", e),
                    })?
                    .port(settings.port)
                    .credentials(Credentials::new(username.clone(), password.to_string()))
                    .build()
            }
            _ => AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&settings.host)
                .port(settings.port)
                .build(),
        };

        Ok(Self { transport })
    }
}

#[async_trait]
impl MailTransport for SmtpMailTransport {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), DeliveryError> {
        let message = build_message(mail)?;
        self.transport
            .send(message)
            .await
            .map_err(|e| DeliveryError::Transport {
                transport: "smtp",
                message: e.to_string(),
            })?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "smtp"
    }
}

/// Writes messages to the application log instead of sending them
pub struct LogOnlyMailTransport;

#[async_trait]
impl MailTransport for LogOnlyMailTransport {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), DeliveryError> {
        // Validate addresses the same way SMTP delivery would
        build_message(mail)?;
        tracing::info!(
            from = %mail.from,
            to = ?mail.to,
            subject = %mail.subject,
            body_bytes = mail.html_body.len(),
            "Email (log-only transport)"
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "log"
    }
}

/// Pick the transport for the configured settings
pub fn build_transport(
    smtp: Option<&SmtpSettings>,
    secret_manager: &SecretManager,
) -> Result<Arc<dyn MailTransport>, DeliveryError> {
    match smtp {
        Some(settings) => {
            tracing::info!(host = %settings.host, port = settings.port, "Using SMTP mail transport");
            Ok(Arc::new(SmtpMailTransport::new(
                settings,
                secret_manager.smtp_password(),
            )?))
        }
        None => {
            tracing::info!("SMTP_HOST not set, emails will be written to the log");
            Ok(Arc::new(LogOnlyMailTransport))
        }
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, DeliveryError> {
    address
        .parse::<Mailbox>()
        .map_err(|e| DeliveryError::InvalidAddress {
            address: address.to_string(),
            message: e.to_string(),
        })
}

fn build_message(mail: &OutgoingMail) -> Result<Message, DeliveryError> {
    if mail.to.is_empty() {
        return Err(DeliveryError::Build("no recipients".to_string()));
    }

    let mut builder = Message::builder()
        .from(parse_mailbox(&mail.from)?)
        .subject(mail.subject.clone())
        .header(ContentType::TEXT_HTML);
    for to in &mail.to {
        builder = builder.to(parse_mailbox(to)?);
    }

    builder
        .body(mail.html_body.clone())
        .map_err(|e| DeliveryError::Build(e.to_string()))
}
