use std::fmt;

use serde_json::Value;

use crate::domain::ContactSubmission;
use crate::domain::validation::{sanitize, sanitize_email};
use crate::notifier::{EmailDispatchResult, Notification, Notifier};
use crate::pipeline::{EmailStatus, IntakeResponse, email_status, notify_both};
use crate::routes::error_chain_fmt;
use crate::store::{RecordStore, StoreError};
use crate::telemetry::mask_email;

/// Raw contact form body. Fields of the wrong JSON type count as empty.
#[derive(Debug, Default, serde::Deserialize)]
pub struct ContactRequest {
    #[serde(default)]
    pub name: Option<Value>,
    #[serde(default)]
    pub email: Option<Value>,
    #[serde(default)]
    pub project: Option<Value>,
    #[serde(default)]
    pub message: Option<Value>,
}

#[derive(thiserror::Error)]
pub enum ContactError {
    #[error("{0}")]
    ValidationError(String),
    #[error("Failed to store the contact submission.")]
    StoreError(#[from] StoreError),
}

impl fmt::Debug for ContactError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        error_chain_fmt(self, f)
    }
}

/// A persisted submission and what happened to its emails.
#[derive(Debug)]
pub struct ContactOutcome {
    pub submission: ContactSubmission,
    pub notification: EmailDispatchResult,
    pub confirmation: EmailDispatchResult,
    pub email_status: EmailStatus,
}

impl ContactOutcome {
    pub fn email_sent(&self) -> bool {
        self.confirmation.is_sent()
    }

    pub fn message(&self) -> &'static str {
        match self.email_status {
            EmailStatus::Unavailable => {
                "Thank you for reaching out! Your message has been received. However, email notifications are currently unavailable. We will contact you directly."
            }
            EmailStatus::Success => {
                "Thank you for reaching out! We will get back to you shortly. A confirmation email has been sent to your inbox."
            }
            EmailStatus::Failed => {
                "Thank you for reaching out! Your message has been received, but we were unable to send a confirmation email. We will contact you directly."
            }
            EmailStatus::Partial => "Thank you for reaching out! We will get back to you shortly.",
        }
    }

    pub fn to_response(&self) -> IntakeResponse {
        IntakeResponse {
            success: true,
            message: self.message().to_string(),
            email_status: Some(self.email_status),
            email_sent: Some(self.email_sent()),
        }
    }
}

/// Validate, persist and acknowledge a contact form submission.
///
/// Nothing is stored or sent when validation fails, and no email is sent
/// when the store rejects the submission. Once the submission is stored,
/// email failures only show up in the outcome.
#[tracing::instrument(
    name = "Handle contact submission",
    skip(store, notifier, request),
    fields(submission_id = tracing::field::Empty, submitter_email = tracing::field::Empty)
)]
pub async fn submit_contact(
    store: &dyn RecordStore,
    notifier: &Notifier,
    request: ContactRequest,
) -> Result<ContactOutcome, ContactError> {
    let submission = ContactSubmission::new(
        sanitize(request.name.as_ref()),
        sanitize_email(request.email.as_ref()),
        sanitize(request.project.as_ref()),
        sanitize(request.message.as_ref()),
    )
    .map_err(ContactError::ValidationError)?;
    let span = tracing::Span::current();
    span.record("submission_id", tracing::field::display(&submission.id));
    span.record(
        "submitter_email",
        tracing::field::display(mask_email(submission.email.as_ref())),
    );

    let submission = store.insert_contact_submission(&submission).await?;
    tracing::info!(
        project = submission.project.as_deref().unwrap_or("Not specified"),
        "Contact submission stored"
    );

    let (notification, confirmation) = notify_both(
        notifier,
        Notification::ContactNotification(&submission),
        Notification::ContactConfirmation(&submission),
    )
    .await;
    if let Some(e) = notification.error() {
        tracing::warn!(error = %e, "Staff notification for contact submission was not sent");
    }
    if let Some(e) = confirmation.error() {
        tracing::error!(error = %e, "Contact confirmation was not sent");
    }

    let email_status = email_status(notifier.is_configured(), &confirmation);
    Ok(ContactOutcome {
        submission,
        notification,
        confirmation,
        email_status,
    })
}
