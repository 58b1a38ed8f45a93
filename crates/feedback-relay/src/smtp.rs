//! SMTP delivery via lettre
//!
//! Every call to [`SmtpMailer::send`] builds its own transport, so the TLS
//! connection lives exactly as long as one delivery: connect, AUTH, MAIL/RCPT/DATA,
//! QUIT. Pooling is compiled out; dropping the transport on an error path
//! closes the socket.

use std::fmt;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox, Message},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Tokio1Executor,
};
use tracing::{debug, instrument};

use crate::template::OutboundMessage;

/// Everything needed for one SMTP delivery
#[derive(Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    /// Sender address, doubles as the SMTP username
    pub from_email: String,
    pub password: String,
    pub recipient: String,
    pub timeout: Duration,
}

impl fmt::Debug for SmtpSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("from_email", &self.from_email)
            .field("password", &"<redacted>")
            .field("recipient", &self.recipient)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Delivers a composed message. Implemented by [`SmtpMailer`] in production
/// and by recording fakes in tests.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, settings: &SmtpSettings, message: &OutboundMessage)
        -> anyhow::Result<()>;
}

/// SMTP-over-TLS (implicit TLS on connect) mailer
#[derive(Debug, Clone, Copy, Default)]
pub struct SmtpMailer;

impl SmtpMailer {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    #[instrument(skip_all, fields(host = %settings.host, port = settings.port))]
    async fn send(
        &self,
        settings: &SmtpSettings,
        message: &OutboundMessage,
    ) -> anyhow::Result<()> {
        let email = build_message(message)?;

        let credentials = Credentials::new(settings.from_email.clone(), settings.password.clone());

        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.host)
            .with_context(|| format!("failed to configure TLS for {}", settings.host))?
            .port(settings.port)
            .credentials(credentials)
            .timeout(Some(settings.timeout))
            .build();

        let response = transport
            .send(email)
            .await
            .with_context(|| format!("SMTP send via {}:{} failed", settings.host, settings.port))?;

        debug!(code = %response.code(), "SMTP server accepted message");
        Ok(())
    }
}

/// Convert an [`OutboundMessage`] into a plain-text MIME message
pub fn build_message(message: &OutboundMessage) -> anyhow::Result<Message> {
    let from: Mailbox = message
        .from
        .parse()
        .with_context(|| format!("invalid sender address: {}", message.from))?;
    let to: Mailbox = message
        .to
        .parse()
        .with_context(|| format!("invalid recipient address: {}", message.to))?;

    let mut builder = Message::builder()
        .from(from)
        .to(to)
        .subject(message.subject.as_str())
        .header(ContentType::TEXT_PLAIN);

    if let Some(ref reply_to) = message.reply_to {
        let reply_to: Mailbox = reply_to
            .parse()
            .with_context(|| format!("invalid reply-to address: {}", reply_to))?;
        builder = builder.reply_to(reply_to);
    }

    builder
        .body(message.body.clone())
        .context("failed to build email message")
}
