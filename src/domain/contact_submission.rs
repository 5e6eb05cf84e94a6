use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::SubmissionEmail;

pub const MISSING_CONTACT_FIELDS: &str =
    "Missing required fields. Please provide name, email, and message.";
pub const INVALID_EMAIL: &str = "Please provide a valid email address.";

/// A contact-form submission. Immutable once created.
#[derive(Debug, Clone, PartialEq)]
pub struct ContactSubmission {
    pub id: Uuid,
    pub name: String,
    pub email: SubmissionEmail,
    pub project: Option<String>,
    pub message: String,
    pub received_at: DateTime<Utc>,
}

impl ContactSubmission {
    /// Build a new submission from already sanitized fields.
    /// An empty `project` is stored as `None`.
    pub fn new(
        name: String,
        email: String,
        project: String,
        message: String,
    ) -> Result<Self, String> {
        if name.is_empty() || email.is_empty() || message.is_empty() {
            return Err(MISSING_CONTACT_FIELDS.to_string());
        }
        let email = SubmissionEmail::parse(email).map_err(|_| INVALID_EMAIL.to_string())?;
        Ok(Self {
            id: Uuid::new_v4(),
            name,
            email,
            project: Some(project).filter(|p| !p.is_empty()),
            message,
            received_at: Utc::now(),
        })
    }
}
