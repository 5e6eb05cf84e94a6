mod templates;

use std::fmt;
use std::io;
use std::sync::Arc;

use crate::domain::{CatalogueAsset, ContactSubmission, NewsletterSubscriber, SubmissionEmail};
use crate::email_client::{EmailAttachment, MailTransport, OutgoingEmail, TransportError};
use crate::telemetry::mask_email;

pub use templates::{EmailRenderer, ProjectHighlight, RenderedEmail};

/// Category of an outbound email.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailKind {
    ContactNotification,
    ContactConfirmation,
    ContactFollowup,
    NewsletterNotification,
    NewsletterConfirmation,
    NewsletterDay3,
    NewsletterDay7,
    CatalogueDelivery,
}

impl EmailKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmailKind::ContactNotification => "contact_notification",
            EmailKind::ContactConfirmation => "contact_confirmation",
            EmailKind::ContactFollowup => "contact_followup",
            EmailKind::NewsletterNotification => "newsletter_notification",
            EmailKind::NewsletterConfirmation => "newsletter_confirmation",
            EmailKind::NewsletterDay3 => "newsletter_day3",
            EmailKind::NewsletterDay7 => "newsletter_day7",
            EmailKind::CatalogueDelivery => "catalogue_delivery",
        }
    }

    /// Staff-bound kinds are delivered to the notification recipient.
    pub fn is_staff_bound(&self) -> bool {
        matches!(
            self,
            EmailKind::ContactNotification | EmailKind::NewsletterNotification
        )
    }
}

impl fmt::Display for EmailKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An email to send, together with the record it is about.
#[derive(Debug, Clone, Copy)]
pub enum Notification<'a> {
    ContactNotification(&'a ContactSubmission),
    ContactConfirmation(&'a ContactSubmission),
    ContactFollowup(&'a ContactSubmission),
    NewsletterNotification(&'a NewsletterSubscriber),
    NewsletterConfirmation(&'a NewsletterSubscriber),
    NewsletterDay3(&'a NewsletterSubscriber),
    NewsletterDay7(&'a NewsletterSubscriber),
    CatalogueDelivery {
        recipient: &'a SubmissionEmail,
        catalogue: &'a CatalogueAsset,
    },
}

impl Notification<'_> {
    pub fn kind(&self) -> EmailKind {
        match self {
            Notification::ContactNotification(_) => EmailKind::ContactNotification,
            Notification::ContactConfirmation(_) => EmailKind::ContactConfirmation,
            Notification::ContactFollowup(_) => EmailKind::ContactFollowup,
            Notification::NewsletterNotification(_) => EmailKind::NewsletterNotification,
            Notification::NewsletterConfirmation(_) => EmailKind::NewsletterConfirmation,
            Notification::NewsletterDay3(_) => EmailKind::NewsletterDay3,
            Notification::NewsletterDay7(_) => EmailKind::NewsletterDay7,
            Notification::CatalogueDelivery { .. } => EmailKind::CatalogueDelivery,
        }
    }

    /// Address of the person the record belongs to.
    fn record_email(&self) -> &SubmissionEmail {
        match self {
            Notification::ContactNotification(s)
            | Notification::ContactConfirmation(s)
            | Notification::ContactFollowup(s) => &s.email,
            Notification::NewsletterNotification(s)
            | Notification::NewsletterConfirmation(s)
            | Notification::NewsletterDay3(s)
            | Notification::NewsletterDay7(s) => &s.email,
            Notification::CatalogueDelivery { recipient, .. } => recipient,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchErrorKind {
    ConfigurationMissing,
    AuthenticationFailed,
    ConnectionFailed,
    AttachmentMissing,
    Rejected,
    Unknown,
}

impl DispatchErrorKind {
    /// Tag reported to API clients.
    pub fn error_type(&self) -> &'static str {
        match self {
            DispatchErrorKind::ConfigurationMissing => "smtp_config_missing",
            DispatchErrorKind::AuthenticationFailed => "smtp_authentication_failed",
            DispatchErrorKind::ConnectionFailed => "smtp_connection_failed",
            DispatchErrorKind::AttachmentMissing => "file_not_found",
            DispatchErrorKind::Rejected => "smtp_error",
            DispatchErrorKind::Unknown => "unknown_error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchError {
    pub kind: DispatchErrorKind,
    pub message: String,
}

impl DispatchError {
    pub fn new(kind: DispatchErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl std::error::Error for DispatchError {}

impl From<TransportError> for DispatchError {
    fn from(e: TransportError) -> Self {
        let kind = match &e {
            TransportError::Authentication(_) => DispatchErrorKind::AuthenticationFailed,
            TransportError::Connection(_) => DispatchErrorKind::ConnectionFailed,
            TransportError::Rejected(_) => DispatchErrorKind::Rejected,
            TransportError::Unexpected(_) => DispatchErrorKind::Unknown,
        };
        Self::new(kind, e.to_string())
    }
}

/// Outcome of a single send. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmailDispatchResult {
    Sent { message_id: String },
    Failed(DispatchError),
}

impl EmailDispatchResult {
    pub fn is_sent(&self) -> bool {
        matches!(self, EmailDispatchResult::Sent { .. })
    }

    pub fn error(&self) -> Option<&DispatchError> {
        match self {
            EmailDispatchResult::Sent { .. } => None,
            EmailDispatchResult::Failed(e) => Some(e),
        }
    }
}

/// Renders and delivers notifications. Errors are reported in the
/// returned [`EmailDispatchResult`], never raised.
pub struct Notifier {
    transport: Option<Arc<dyn MailTransport>>,
    renderer: EmailRenderer,
    sender_name: String,
    notification_recipient: SubmissionEmail,
}

impl Notifier {
    /// `transport` is `None` when no mail credentials are configured.
    pub fn new(
        transport: Option<Arc<dyn MailTransport>>,
        renderer: EmailRenderer,
        sender_name: String,
        notification_recipient: SubmissionEmail,
    ) -> Self {
        Self {
            transport,
            renderer,
            sender_name,
            notification_recipient,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.transport.is_some()
    }

    #[tracing::instrument(
        name = "Send notification",
        skip(self, notification),
        fields(
            kind = %notification.kind(),
            recipient = tracing::field::Empty,
            message_id = tracing::field::Empty,
        )
    )]
    pub async fn send(&self, notification: Notification<'_>) -> EmailDispatchResult {
        let Some(transport) = &self.transport else {
            tracing::warn!("Mail transport is not configured, skipping email");
            return EmailDispatchResult::Failed(DispatchError::new(
                DispatchErrorKind::ConfigurationMissing,
                "SMTP credentials are not configured",
            ));
        };

        let kind = notification.kind();
        let to = if kind.is_staff_bound() {
            self.notification_recipient.clone()
        } else {
            notification.record_email().clone()
        };
        tracing::Span::current().record("recipient", tracing::field::display(mask_email(to.as_ref())));

        let attachment = match notification {
            Notification::CatalogueDelivery { catalogue, .. } => match load_attachment(catalogue).await {
                Ok(attachment) => Some(attachment),
                Err(e) => {
                    tracing::error!(error = %e, "Failed to attach the catalogue");
                    return EmailDispatchResult::Failed(e);
                }
            },
            _ => None,
        };

        let rendered = self.renderer.render(&notification);
        let email = OutgoingEmail {
            from_name: rendered.from_name.unwrap_or_else(|| self.sender_name.clone()),
            to,
            subject: rendered.subject,
            html_body: rendered.html,
            text_body: rendered.text,
            attachment,
        };

        match transport.send(email).await {
            Ok(message_id) => {
                tracing::Span::current().record("message_id", tracing::field::display(&message_id));
                tracing::info!("Email sent");
                EmailDispatchResult::Sent { message_id }
            }
            Err(e) => {
                tracing::error!(error.cause_chain = ?e, error.message = %e, "Failed to send email");
                EmailDispatchResult::Failed(e.into())
            }
        }
    }

    /// Check that the mail server accepts our connection and credentials.
    pub async fn verify_connection(&self) -> Result<(), DispatchError> {
        let Some(transport) = &self.transport else {
            return Err(DispatchError::new(
                DispatchErrorKind::ConfigurationMissing,
                "SMTP credentials are not configured",
            ));
        };
        transport.verify_connection().await.map_err(DispatchError::from)
    }
}

async fn load_attachment(catalogue: &CatalogueAsset) -> Result<EmailAttachment, DispatchError> {
    match catalogue.read().await {
        Ok(content) => Ok(EmailAttachment {
            filename: catalogue.attachment_filename.clone(),
            content_type: "application/pdf".to_string(),
            content,
        }),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(DispatchError::new(
            DispatchErrorKind::AttachmentMissing,
            format!("Catalogue file not found at {}", catalogue.path.display()),
        )),
        Err(e) => Err(DispatchError::new(
            DispatchErrorKind::Unknown,
            format!("Failed to read the catalogue: {}", e),
        )),
    }
}
