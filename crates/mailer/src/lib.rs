//! Outbound mail transport.
//!
//! [`MailTransport`] is the seam the send path talks to; [`SmtpMailer`] is the
//! production implementation on top of the `lettre` async SMTP transport.
//! Configuration is loaded from environment variables; when either credential
//! is missing the mailer reports itself as not configured and refuses to send
//! without touching the network.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for mail delivery failures.
///
/// The display strings are user-facing: each kind tells the operator what to
/// check next.
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    /// Relay credentials are not set.
    #[error("Email service is not configured. Set EMAIL_USER and EMAIL_PASS.")]
    NotConfigured,

    /// The relay rejected the credentials.
    #[error("Email authentication failed. Check EMAIL_USER and EMAIL_PASS: {0}")]
    Authentication(String),

    /// The relay could not be reached or the TLS session failed.
    #[error("Could not connect to the email server: {0}")]
    Connection(String),

    /// The relay accepted the connection but refused the message.
    #[error("Failed to send email: {0}")]
    Send(String),

    /// The recipient or sender address could not be parsed.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// The MIME message could not be assembled.
    #[error("Email build error: {0}")]
    Build(String),
}

/// Map an SMTP failure onto a [`MailError`] kind.
///
/// `status` is the three-digit reply code when the relay answered; 53x codes
/// are authentication failures. Without a reply code the failure happened
/// before or outside the SMTP dialogue, which is a connection problem unless
/// the client itself rejected the exchange.
pub fn classify_smtp_failure(status: Option<&str>, client_side: bool, detail: String) -> MailError {
    match status {
        Some(code) if code.starts_with("53") => MailError::Authentication(detail),
        Some(_) => MailError::Send(detail),
        None if client_side => MailError::Send(detail),
        None => MailError::Connection(detail),
    }
}

impl From<lettre::transport::smtp::Error> for MailError {
    fn from(err: lettre::transport::smtp::Error) -> Self {
        let status = err.status().map(|code| code.to_string());
        let client_side = !err.is_timeout() && (err.is_client() || err.is_response());
        classify_smtp_failure(status.as_deref(), client_side, err.to_string())
    }
}

// ---------------------------------------------------------------------------
// Transport seam
// ---------------------------------------------------------------------------

/// A fully rendered message for a single recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Acknowledgement returned by the transport after a successful send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReceipt {
    pub message_id: String,
    pub accepted: Vec<String>,
}

/// Something that can deliver a rendered message.
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Whether credentials are present. Sends fail fast when this is `false`.
    fn is_configured(&self) -> bool;

    /// Deliver one message. No retries are attempted.
    async fn send(&self, message: OutgoingMessage) -> Result<DeliveryReceipt, MailError>;
}

// ---------------------------------------------------------------------------
// MailConfig
// ---------------------------------------------------------------------------

/// Default SMTP relay.
const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";

/// Default SMTP port (STARTTLS).
const DEFAULT_SMTP_PORT: u16 = 587;

/// Default display name on outgoing mail.
const DEFAULT_FROM_NAME: &str = "Stencil";

/// Configuration for the SMTP mail transport.
#[derive(Debug, Clone)]
pub struct MailConfig {
    /// SMTP server hostname.
    pub smtp_host: String,
    /// SMTP server port (defaults to 587).
    pub smtp_port: u16,
    /// Relay username; also used as the sender address.
    pub username: Option<String>,
    /// Relay password.
    pub password: Option<String>,
    /// Display name in the "From" header.
    pub from_name: String,
}

impl MailConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable         | Default          |
    /// |------------------|------------------|
    /// | `SMTP_HOST`      | `smtp.gmail.com` |
    /// | `SMTP_PORT`      | `587`            |
    /// | `EMAIL_USER`     | unset            |
    /// | `EMAIL_PASS`     | unset            |
    /// | `MAIL_FROM_NAME` | `Stencil`        |
    pub fn from_env() -> Self {
        let non_empty = |key: &str| std::env::var(key).ok().filter(|v| !v.trim().is_empty());
        Self {
            smtp_host: non_empty("SMTP_HOST").unwrap_or_else(|| DEFAULT_SMTP_HOST.to_string()),
            smtp_port: std::env::var("SMTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_SMTP_PORT),
            username: non_empty("EMAIL_USER"),
            password: non_empty("EMAIL_PASS"),
            from_name: non_empty("MAIL_FROM_NAME")
                .unwrap_or_else(|| DEFAULT_FROM_NAME.to_string()),
        }
    }

    /// Both credentials are present.
    pub fn is_configured(&self) -> bool {
        self.username.is_some() && self.password.is_some()
    }
}

// ---------------------------------------------------------------------------
// SmtpMailer
// ---------------------------------------------------------------------------

/// Sends HTML email through an SMTP relay with STARTTLS.
pub struct SmtpMailer {
    config: MailConfig,
}

impl SmtpMailer {
    pub fn new(config: MailConfig) -> Self {
        Self { config }
    }

    fn build_message(
        &self,
        sender: &str,
        message: &OutgoingMessage,
        message_id: &str,
    ) -> Result<Message, MailError> {
        let from = Mailbox::new(
            Some(self.config.from_name.clone()),
            sender
                .parse()
                .map_err(|e: lettre::address::AddressError| MailError::InvalidAddress(e.to_string()))?,
        );
        let to: Mailbox = message
            .to
            .trim()
            .parse()
            .map_err(|e: lettre::address::AddressError| MailError::InvalidAddress(e.to_string()))?;

        Message::builder()
            .from(from)
            .to(to)
            .subject(message.subject.clone())
            .message_id(Some(message_id.to_string()))
            .header(ContentType::TEXT_HTML)
            .body(message.html.clone())
            .map_err(|e| MailError::Build(e.to_string()))
    }
}

/// A globally unique `Message-ID` in the sender's domain.
fn generate_message_id(sender: &str) -> String {
    let domain = sender.rsplit_once('@').map_or("localhost", |(_, d)| d);
    format!("<{}@{}>", uuid::Uuid::new_v4(), domain)
}

#[async_trait]
impl MailTransport for SmtpMailer {
    fn is_configured(&self) -> bool {
        self.config.is_configured()
    }

    async fn send(&self, message: OutgoingMessage) -> Result<DeliveryReceipt, MailError> {
        let (Some(user), Some(pass)) = (&self.config.username, &self.config.password) else {
            return Err(MailError::NotConfigured);
        };

        let message_id = generate_message_id(user);
        let email = self.build_message(user, &message, &message_id)?;

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.smtp_host)?
            .port(self.config.smtp_port)
            .credentials(Credentials::new(user.clone(), pass.clone()))
            .build();

        mailer.send(email).await?;

        tracing::info!(to = %message.to, message_id = %message_id, "Email sent");
        Ok(DeliveryReceipt {
            message_id,
            accepted: vec![message.to],
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
