//! Intake pipelines: validate, persist, notify, then report what happened.

mod catalogue;
mod contact;
mod newsletter;

use std::panic::AssertUnwindSafe;

use futures::FutureExt;

use crate::notifier::{
    DispatchError, DispatchErrorKind, EmailDispatchResult, Notification, Notifier,
};

pub use catalogue::{
    CATALOGUE_SENT, CatalogueError, CatalogueRequest, MISSING_CATALOGUE_EMAIL, send_catalogue,
};
pub use contact::{ContactError, ContactOutcome, ContactRequest, submit_contact};
pub use newsletter::{
    ALREADY_SUBSCRIBED, NewsletterError, NewsletterOutcome, NewsletterRequest, subscribe,
};

/// Summary of the confirmation email reported back to the submitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmailStatus {
    Success,
    /// Part of the wire format, never produced.
    Partial,
    Failed,
    Unavailable,
}

/// Derive the status from the outcome of the confirmation email alone.
pub fn email_status(transport_configured: bool, confirmation: &EmailDispatchResult) -> EmailStatus {
    if !transport_configured {
        EmailStatus::Unavailable
    } else if confirmation.is_sent() {
        EmailStatus::Success
    } else {
        EmailStatus::Failed
    }
}

/// Body returned once a submission has been persisted.
#[derive(Debug, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntakeResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_status: Option<EmailStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_sent: Option<bool>,
}

/// Send the staff notification and the confirmation concurrently and wait
/// for both. A panicking send is reported as an `Unknown` failure and does
/// not affect the other one.
pub async fn notify_both(
    notifier: &Notifier,
    staff: Notification<'_>,
    confirmation: Notification<'_>,
) -> (EmailDispatchResult, EmailDispatchResult) {
    futures::join!(
        send_isolated(notifier, staff),
        send_isolated(notifier, confirmation)
    )
}

async fn send_isolated(notifier: &Notifier, notification: Notification<'_>) -> EmailDispatchResult {
    let kind = notification.kind();
    match AssertUnwindSafe(notifier.send(notification))
        .catch_unwind()
        .await
    {
        Ok(outcome) => outcome,
        Err(_) => {
            tracing::error!(%kind, "Email task panicked");
            EmailDispatchResult::Failed(DispatchError::new(
                DispatchErrorKind::Unknown,
                format!("Sending {} panicked", kind),
            ))
        }
    }
}
