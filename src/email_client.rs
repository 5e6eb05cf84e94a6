use std::fmt;
use std::io;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use secrecy::{ExposeSecret, SecretString};
use uuid::Uuid;

use crate::domain::SubmissionEmail;
use crate::routes::error_chain_fmt;

/// A fully rendered message, ready to be handed to a [`MailTransport`].
#[derive(Debug, Clone)]
pub struct OutgoingEmail {
    pub from_name: String,
    pub to: SubmissionEmail,
    pub subject: String,
    pub html_body: String,
    pub text_body: String,
    pub attachment: Option<EmailAttachment>,
}

#[derive(Clone)]
pub struct EmailAttachment {
    pub filename: String,
    pub content_type: String,
    pub content: Vec<u8>,
}

impl fmt::Debug for EmailAttachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmailAttachment")
            .field("filename", &self.filename)
            .field("content_type", &self.content_type)
            .field("size", &self.content.len())
            .finish()
    }
}

#[derive(thiserror::Error)]
pub enum TransportError {
    #[error("SMTP authentication failed: {0}")]
    Authentication(String),
    #[error("Cannot connect to the SMTP server: {0}")]
    Connection(String),
    #[error("The SMTP server rejected the message: {0}")]
    Rejected(String),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl fmt::Debug for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        error_chain_fmt(self, f)
    }
}

/// Outbound mail delivery.
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Deliver one message, returning its `Message-ID`.
    async fn send(&self, email: OutgoingEmail) -> Result<String, TransportError>;

    /// Open a connection and authenticate without sending anything.
    async fn verify_connection(&self) -> Result<(), TransportError>;
}

/// SMTP client; implicit TLS on port 465, STARTTLS on every other port.
pub struct SmtpEmailClient {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    sender: SubmissionEmail,
    host: String,
}

impl SmtpEmailClient {
    pub fn new(
        host: &str,
        port: u16,
        sender: SubmissionEmail,
        credentials: (String, SecretString),
        timeout: Duration,
    ) -> Result<Self, anyhow::Error> {
        let builder = if port == 465 {
            AsyncSmtpTransport::<Tokio1Executor>::relay(host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
        }
        .with_context(|| format!("Failed to configure the SMTP relay for {}", host))?;
        let (username, password) = credentials;
        let mailer = builder
            .port(port)
            .credentials(Credentials::new(
                username,
                password.expose_secret().to_string(),
            ))
            .timeout(Some(timeout))
            .build();
        Ok(Self {
            mailer,
            sender,
            host: host.to_string(),
        })
    }

    fn build_message(&self, email: OutgoingEmail) -> Result<(Message, String), anyhow::Error> {
        let domain = self
            .sender
            .as_ref()
            .rsplit_once('@')
            .map(|(_, domain)| domain.to_string())
            .unwrap_or_else(|| self.host.clone());
        let message_id = format!("<{}@{}>", Uuid::new_v4(), domain);

        let from = Mailbox::new(
            Some(email.from_name),
            self.sender.as_ref().parse().context("Invalid sender address")?,
        );
        let to = Mailbox::new(None, email.to.as_ref().parse().context("Invalid recipient address")?);
        let body = MultiPart::alternative_plain_html(email.text_body, email.html_body);
        let body = match email.attachment {
            Some(attachment) => {
                let content_type = ContentType::parse(&attachment.content_type)
                    .context("Invalid attachment content type")?;
                MultiPart::mixed()
                    .multipart(body)
                    .singlepart(Attachment::new(attachment.filename).body(attachment.content, content_type))
            }
            None => body,
        };

        let message = Message::builder()
            .from(from)
            .to(to)
            .subject(email.subject)
            .message_id(Some(message_id.clone()))
            .multipart(body)
            .context("Failed to build email message")?;
        Ok((message, message_id))
    }
}

#[async_trait]
impl MailTransport for SmtpEmailClient {
    async fn send(&self, email: OutgoingEmail) -> Result<String, TransportError> {
        let (message, message_id) = self.build_message(email)?;
        self.mailer.send(message).await.map_err(classify)?;
        Ok(message_id)
    }

    async fn verify_connection(&self) -> Result<(), TransportError> {
        match self.mailer.test_connection().await {
            Ok(true) => Ok(()),
            Ok(false) => Err(TransportError::Connection(format!(
                "{} did not accept the connection",
                self.host
            ))),
            Err(e) => Err(classify(e)),
        }
    }
}

/// Map an SMTP failure onto the categories callers report on.
fn classify(e: lettre::transport::smtp::Error) -> TransportError {
    let description = e.to_string();
    let status = e.status().map(|code| code.to_string());
    let auth_code = matches!(status.as_deref(), Some("530" | "534" | "535" | "454"));
    let io_failure = std::error::Error::source(&e)
        .and_then(|source| source.downcast_ref::<io::Error>())
        .is_some();

    if auth_code || (e.is_client() && description.to_lowercase().contains("authentication")) {
        TransportError::Authentication(description)
    } else if e.is_timeout() || e.is_tls() || io_failure {
        TransportError::Connection(description)
    } else if e.is_permanent() || e.is_transient() || e.is_response() {
        TransportError::Rejected(description)
    } else {
        TransportError::Unexpected(anyhow::Error::new(e))
    }
}
