use std::fmt;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{ContactSubmission, NewsletterSubscriber, SubmissionEmail};
use crate::routes::error_chain_fmt;

#[cfg(test)]
pub mod memory;
mod postgres;

pub use postgres::PgRecordStore;

/// The tables this service writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    ContactSubmissions,
    NewsletterSubscribers,
}

impl Collection {
    pub fn table_name(&self) -> &'static str {
        match self {
            Collection::ContactSubmissions => "contact_submissions",
            Collection::NewsletterSubscribers => "newsletter_subscribers",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table_name())
    }
}

/// Result of an insert guarded by a uniqueness constraint.
#[derive(Debug, Clone, PartialEq)]
pub enum InsertOutcome<T> {
    Inserted(T),
    AlreadyExists,
}

#[derive(thiserror::Error)]
pub enum StoreError {
    #[error("The record store is unavailable.")]
    Unavailable(#[source] anyhow::Error),
    #[error("The record store rejected the operation on `{collection}`.")]
    Rejected {
        collection: Collection,
        #[source]
        source: anyhow::Error,
    },
}

impl fmt::Debug for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        error_chain_fmt(self, f)
    }
}

/// Persistence for submissions and subscribers.
///
/// Every call is a single attempt against the backing store; nothing is retried.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn insert_contact_submission(
        &self,
        submission: &ContactSubmission,
    ) -> Result<ContactSubmission, StoreError>;

    /// Insert a subscriber. A uniqueness violation on the email is reported as
    /// [`InsertOutcome::AlreadyExists`], not as an error.
    async fn insert_newsletter_subscriber(
        &self,
        subscriber: &NewsletterSubscriber,
    ) -> Result<InsertOutcome<NewsletterSubscriber>, StoreError>;

    async fn find_newsletter_subscriber_by_email(
        &self,
        email: &SubmissionEmail,
    ) -> Result<Option<NewsletterSubscriber>, StoreError>;

    async fn find_contact_submission_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<ContactSubmission>, StoreError>;
}
