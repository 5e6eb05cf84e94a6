use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::SubmissionEmail;

pub const MISSING_SUBSCRIBER_EMAIL: &str = "Email is required to subscribe.";
pub const INVALID_SUBSCRIBER_EMAIL: &str = "Please enter a valid email address.";

/// A newsletter subscriber; at most one per normalized email.
#[derive(Debug, Clone, PartialEq)]
pub struct NewsletterSubscriber {
    pub id: Uuid,
    pub name: Option<String>,
    pub email: SubmissionEmail,
    pub subscribed_at: DateTime<Utc>,
}

impl NewsletterSubscriber {
    pub fn new(name: String, email: String) -> Result<Self, String> {
        if email.is_empty() {
            return Err(MISSING_SUBSCRIBER_EMAIL.to_string());
        }
        let email =
            SubmissionEmail::parse(email).map_err(|_| INVALID_SUBSCRIBER_EMAIL.to_string())?;
        Ok(Self {
            id: Uuid::new_v4(),
            name: Some(name).filter(|n| !n.is_empty()),
            email,
            subscribed_at: Utc::now(),
        })
    }

    /// Name to greet the subscriber with.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Valued Subscriber")
    }
}
