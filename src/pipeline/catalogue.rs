use std::fmt;

use anyhow::Context;
use serde_json::Value;

use crate::domain::validation::{sanitize_email, validate_email};
use crate::domain::{CatalogueAsset, INVALID_EMAIL, MAX_ATTACHMENT_BYTES, SubmissionEmail};
use crate::notifier::{DispatchError, DispatchErrorKind, EmailDispatchResult, Notification, Notifier};
use crate::routes::error_chain_fmt;
use crate::telemetry::mask_email;

pub const MISSING_CATALOGUE_EMAIL: &str = "Email address is required.";
pub const CATALOGUE_SENT: &str = "Catalogue sent successfully! Please check your email inbox.";

#[derive(Debug, Default, serde::Deserialize)]
pub struct CatalogueRequest {
    #[serde(default)]
    pub email: Option<Value>,
}

#[derive(thiserror::Error)]
pub enum CatalogueError {
    #[error("{0}")]
    ValidationError(String),
    #[error("Email service is currently unavailable. Please try downloading the catalogue directly or contact us for assistance.")]
    ConfigurationMissing,
    #[error("Catalogue file not found. Please contact support.")]
    FileNotFound,
    #[error("Failed to send the catalogue email.")]
    DispatchFailed(#[source] DispatchError),
    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),
}

impl fmt::Debug for CatalogueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl CatalogueError {
    /// Failure category, `None` for invalid input.
    pub fn kind(&self) -> Option<DispatchErrorKind> {
        match self {
            CatalogueError::ValidationError(_) => None,
            CatalogueError::ConfigurationMissing => Some(DispatchErrorKind::ConfigurationMissing),
            CatalogueError::FileNotFound => Some(DispatchErrorKind::AttachmentMissing),
            CatalogueError::DispatchFailed(e) => Some(e.kind),
            CatalogueError::UnexpectedError(_) => Some(DispatchErrorKind::Unknown),
        }
    }

    pub fn error_type(&self) -> Option<&'static str> {
        self.kind().map(|kind| kind.error_type())
    }

    /// Message shown to the person who asked for the catalogue.
    pub fn user_message(&self) -> String {
        match self {
            CatalogueError::DispatchFailed(e) => match e.kind {
                DispatchErrorKind::ConfigurationMissing => {
                    "Email service configuration is missing. Please contact support.".to_string()
                }
                DispatchErrorKind::AuthenticationFailed => {
                    "Email service authentication failed. Please check SMTP configuration.".to_string()
                }
                DispatchErrorKind::ConnectionFailed => {
                    "Cannot connect to email server. Please check network and SMTP settings.".to_string()
                }
                DispatchErrorKind::AttachmentMissing => CatalogueError::FileNotFound.to_string(),
                DispatchErrorKind::Rejected => {
                    format!("Email service error: {}. Please try again later.", e.message)
                }
                DispatchErrorKind::Unknown => UNKNOWN_FAILURE.to_string(),
            },
            CatalogueError::UnexpectedError(_) => UNKNOWN_FAILURE.to_string(),
            other => other.to_string(),
        }
    }
}

const UNKNOWN_FAILURE: &str =
    "Unable to send catalogue email right now. Please try again later or contact us directly.";

/// Email the catalogue PDF to whoever asked for it. Returns the message id.
#[tracing::instrument(
    name = "Send catalogue by email",
    skip(notifier, catalogue, request),
    fields(requester_email = tracing::field::Empty)
)]
pub async fn send_catalogue(
    notifier: &Notifier,
    catalogue: &CatalogueAsset,
    request: CatalogueRequest,
) -> Result<String, CatalogueError> {
    let email = sanitize_email(request.email.as_ref());
    if email.is_empty() {
        return Err(CatalogueError::ValidationError(MISSING_CATALOGUE_EMAIL.into()));
    }
    if !validate_email(&email) {
        return Err(CatalogueError::ValidationError(INVALID_EMAIL.into()));
    }
    let recipient = SubmissionEmail::parse(email).map_err(CatalogueError::ValidationError)?;
    tracing::Span::current().record(
        "requester_email",
        tracing::field::display(mask_email(recipient.as_ref())),
    );

    if !notifier.is_configured() {
        tracing::warn!("Catalogue requested but the mail transport is not configured");
        return Err(CatalogueError::ConfigurationMissing);
    }

    let size = catalogue
        .size()
        .await
        .context("Failed to inspect the catalogue file")?;
    let Some(size) = size else {
        tracing::error!(path = %catalogue.path.display(), "Catalogue file not found");
        return Err(CatalogueError::FileNotFound);
    };
    if size > MAX_ATTACHMENT_BYTES {
        tracing::warn!(
            size_mb = %format!("{:.2}", size as f64 / (1024.0 * 1024.0)),
            "Catalogue file may exceed email server limits"
        );
    }

    match notifier
        .send(Notification::CatalogueDelivery {
            recipient: &recipient,
            catalogue,
        })
        .await
    {
        EmailDispatchResult::Sent { message_id } => {
            tracing::info!("Catalogue email sent");
            Ok(message_id)
        }
        EmailDispatchResult::Failed(e) => Err(CatalogueError::DispatchFailed(e)),
    }
}
