use std::sync::Mutex;

use anyhow::anyhow;
use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{ContactSubmission, NewsletterSubscriber, SubmissionEmail};
use crate::store::{Collection, InsertOutcome, RecordStore, StoreError};

/// In-process [`RecordStore`] for pipeline tests.
#[derive(Default)]
pub struct InMemoryRecordStore {
    contact_submissions: Mutex<Vec<ContactSubmission>>,
    newsletter_subscribers: Mutex<Vec<NewsletterSubscriber>>,
    unavailable: bool,
    failing_lookups: bool,
    blind_lookups: bool,
}

impl InMemoryRecordStore {
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    /// Subscriber lookups fail, inserts still work.
    pub fn with_failing_lookups() -> Self {
        Self {
            failing_lookups: true,
            ..Self::default()
        }
    }

    /// Lookups never see existing rows, forcing inserts to hit the unique constraint.
    pub fn with_blind_lookups() -> Self {
        Self {
            blind_lookups: true,
            ..Self::default()
        }
    }

    pub fn contact_submissions(&self) -> Vec<ContactSubmission> {
        self.contact_submissions.lock().unwrap().clone()
    }

    pub fn newsletter_subscribers(&self) -> Vec<NewsletterSubscriber> {
        self.newsletter_subscribers.lock().unwrap().clone()
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable {
            Err(StoreError::Unavailable(anyhow!("connection refused")))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn insert_contact_submission(
        &self,
        submission: &ContactSubmission,
    ) -> Result<ContactSubmission, StoreError> {
        self.check_available()?;
        self.contact_submissions
            .lock()
            .unwrap()
            .push(submission.clone());
        Ok(submission.clone())
    }

    async fn insert_newsletter_subscriber(
        &self,
        subscriber: &NewsletterSubscriber,
    ) -> Result<InsertOutcome<NewsletterSubscriber>, StoreError> {
        self.check_available()?;
        let mut subscribers = self.newsletter_subscribers.lock().unwrap();
        if subscribers.iter().any(|s| s.email == subscriber.email) {
            return Ok(InsertOutcome::AlreadyExists);
        }
        subscribers.push(subscriber.clone());
        Ok(InsertOutcome::Inserted(subscriber.clone()))
    }

    async fn find_newsletter_subscriber_by_email(
        &self,
        email: &SubmissionEmail,
    ) -> Result<Option<NewsletterSubscriber>, StoreError> {
        self.check_available()?;
        if self.failing_lookups {
            return Err(StoreError::Rejected {
                collection: Collection::NewsletterSubscribers,
                source: anyhow!("permission denied for table newsletter_subscribers"),
            });
        }
        if self.blind_lookups {
            return Ok(None);
        }
        Ok(self
            .newsletter_subscribers
            .lock()
            .unwrap()
            .iter()
            .find(|s| &s.email == email)
            .cloned())
    }

    async fn find_contact_submission_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<ContactSubmission>, StoreError> {
        self.check_available()?;
        Ok(self
            .contact_submissions
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.id == id)
            .cloned())
    }
}
