use std::fmt;

use serde_json::Value;

use crate::domain::NewsletterSubscriber;
use crate::domain::validation::{sanitize, sanitize_email};
use crate::notifier::{EmailDispatchResult, Notification, Notifier};
use crate::pipeline::{EmailStatus, IntakeResponse, email_status, notify_both};
use crate::routes::error_chain_fmt;
use crate::store::{InsertOutcome, RecordStore, StoreError};
use crate::telemetry::mask_email;

pub const ALREADY_SUBSCRIBED: &str = "You are already subscribed. Thank you for staying in touch!";

#[derive(Debug, Default, serde::Deserialize)]
pub struct NewsletterRequest {
    #[serde(default)]
    pub name: Option<Value>,
    #[serde(default)]
    pub email: Option<Value>,
}

#[derive(thiserror::Error)]
pub enum NewsletterError {
    #[error("{0}")]
    ValidationError(String),
    #[error("Failed to store the newsletter subscription.")]
    StoreError(#[from] StoreError),
}

impl fmt::Debug for NewsletterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        error_chain_fmt(self, f)
    }
}

#[derive(Debug)]
pub enum NewsletterOutcome {
    Subscribed {
        subscriber: NewsletterSubscriber,
        notification: EmailDispatchResult,
        confirmation: EmailDispatchResult,
        email_status: EmailStatus,
    },
    /// The email was already on the list; nothing was written or sent.
    AlreadySubscribed,
}

impl NewsletterOutcome {
    pub fn to_response(&self) -> IntakeResponse {
        match self {
            NewsletterOutcome::Subscribed {
                confirmation,
                email_status,
                ..
            } => IntakeResponse {
                success: true,
                message: subscribed_message(*email_status).to_string(),
                email_status: Some(*email_status),
                email_sent: Some(confirmation.is_sent()),
            },
            NewsletterOutcome::AlreadySubscribed => IntakeResponse {
                success: true,
                message: ALREADY_SUBSCRIBED.to_string(),
                email_status: None,
                email_sent: None,
            },
        }
    }
}

fn subscribed_message(status: EmailStatus) -> &'static str {
    match status {
        EmailStatus::Unavailable => {
            "Thank you for subscribing! Your subscription has been recorded. However, email notifications are currently unavailable. We will contact you directly."
        }
        EmailStatus::Success => {
            "Welcome aboard! You will start receiving our updates shortly. A confirmation email has been sent to your inbox."
        }
        EmailStatus::Failed => {
            "Thank you for subscribing! Your subscription has been recorded, but we were unable to send a confirmation email. We will contact you directly."
        }
        EmailStatus::Partial => "Welcome aboard! You will start receiving our updates shortly.",
    }
}

/// Add a subscriber to the newsletter.
///
/// Subscribing twice with the same email is a successful no-op, whether the
/// duplicate is caught by the lookup or by the unique constraint on insert.
#[tracing::instrument(
    name = "Handle newsletter subscription",
    skip(store, notifier, request),
    fields(subscriber_email = tracing::field::Empty)
)]
pub async fn subscribe(
    store: &dyn RecordStore,
    notifier: &Notifier,
    request: NewsletterRequest,
) -> Result<NewsletterOutcome, NewsletterError> {
    let subscriber = NewsletterSubscriber::new(
        sanitize(request.name.as_ref()),
        sanitize_email(request.email.as_ref()),
    )
    .map_err(NewsletterError::ValidationError)?;
    tracing::Span::current().record(
        "subscriber_email",
        tracing::field::display(mask_email(subscriber.email.as_ref())),
    );

    match store.find_newsletter_subscriber_by_email(&subscriber.email).await {
        Ok(Some(_)) => {
            tracing::info!("Duplicate newsletter subscription ignored");
            return Ok(NewsletterOutcome::AlreadySubscribed);
        }
        Ok(None) => {}
        // The insert below is still guarded by the unique constraint.
        Err(e) => {
            tracing::warn!(error.cause_chain = ?e, "Failed to check for an existing subscriber");
        }
    }

    let subscriber = match store.insert_newsletter_subscriber(&subscriber).await? {
        InsertOutcome::Inserted(subscriber) => subscriber,
        InsertOutcome::AlreadyExists => {
            tracing::info!("Duplicate newsletter subscription ignored (unique constraint)");
            return Ok(NewsletterOutcome::AlreadySubscribed);
        }
    };
    tracing::info!(subscriber_id = %subscriber.id, "Newsletter subscription stored");

    let (notification, confirmation) = notify_both(
        notifier,
        Notification::NewsletterNotification(&subscriber),
        Notification::NewsletterConfirmation(&subscriber),
    )
    .await;
    if let Some(e) = notification.error() {
        tracing::warn!(error = %e, "Staff notification for newsletter subscription was not sent");
    }
    if let Some(e) = confirmation.error() {
        tracing::error!(error = %e, "Newsletter confirmation was not sent");
    }

    let email_status = email_status(notifier.is_configured(), &confirmation);
    Ok(NewsletterOutcome::Subscribed {
        subscriber,
        notification,
        confirmation,
        email_status,
    })
}
