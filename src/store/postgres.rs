use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{ContactSubmission, NewsletterSubscriber, SubmissionEmail};
use crate::store::{Collection, InsertOutcome, RecordStore, StoreError};

/// [`RecordStore`] backed by the hosted Postgres database.
#[derive(Clone)]
pub struct PgRecordStore {
    pool: PgPool,
}

impl PgRecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ContactSubmissionRow {
    id: Uuid,
    name: String,
    email: String,
    project: Option<String>,
    message: String,
    received_at: DateTime<Utc>,
}

impl TryFrom<ContactSubmissionRow> for ContactSubmission {
    type Error = String;

    fn try_from(row: ContactSubmissionRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            name: row.name,
            email: SubmissionEmail::parse(row.email)?,
            project: row.project,
            message: row.message,
            received_at: row.received_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct NewsletterSubscriberRow {
    id: Uuid,
    name: Option<String>,
    email: String,
    subscribed_at: DateTime<Utc>,
}

impl TryFrom<NewsletterSubscriberRow> for NewsletterSubscriber {
    type Error = String;

    fn try_from(row: NewsletterSubscriberRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            name: row.name,
            email: SubmissionEmail::parse(row.email)?,
            subscribed_at: row.subscribed_at,
        })
    }
}

/// Split connection-level failures from rejections by the database itself.
fn classify(collection: Collection, e: sqlx::Error) -> StoreError {
    tracing::error!("Failed to execute query on {}: {:?}", collection, e);
    if matches!(
        e,
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) | sqlx::Error::Tls(_)
    ) {
        StoreError::Unavailable(e.into())
    } else {
        StoreError::Rejected {
            collection,
            source: e.into(),
        }
    }
}

fn invalid_row(collection: Collection, reason: String) -> StoreError {
    StoreError::Rejected {
        collection,
        source: anyhow!("Stored row is invalid: {}", reason),
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    #[tracing::instrument(
        name = "Saving new contact submission in the database",
        skip(self, submission),
        fields(submission_id = %submission.id)
    )]
    async fn insert_contact_submission(
        &self,
        submission: &ContactSubmission,
    ) -> Result<ContactSubmission, StoreError> {
        let collection = Collection::ContactSubmissions;
        let row = sqlx::query_as::<_, ContactSubmissionRow>(
            r#"
            INSERT INTO contact_submissions (id, name, email, project, message, received_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, name, email, project, message, received_at
            "#,
        )
        .bind(submission.id)
        .bind(&submission.name)
        .bind(submission.email.as_ref())
        .bind(submission.project.as_deref())
        .bind(&submission.message)
        .bind(submission.received_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| classify(collection, e))?;
        row.try_into().map_err(|e| invalid_row(collection, e))
    }

    #[tracing::instrument(
        name = "Saving new newsletter subscriber in the database",
        skip(self, subscriber),
        fields(subscriber_id = %subscriber.id)
    )]
    async fn insert_newsletter_subscriber(
        &self,
        subscriber: &NewsletterSubscriber,
    ) -> Result<InsertOutcome<NewsletterSubscriber>, StoreError> {
        let collection = Collection::NewsletterSubscribers;
        let row = sqlx::query_as::<_, NewsletterSubscriberRow>(
            r#"
            INSERT INTO newsletter_subscribers (id, name, email, subscribed_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (email) DO NOTHING
            RETURNING id, name, email, subscribed_at
            "#,
        )
        .bind(subscriber.id)
        .bind(subscriber.name.as_deref())
        .bind(subscriber.email.as_ref())
        .bind(subscriber.subscribed_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| classify(collection, e))?;
        match row {
            Some(row) => Ok(InsertOutcome::Inserted(
                row.try_into().map_err(|e| invalid_row(collection, e))?,
            )),
            None => Ok(InsertOutcome::AlreadyExists),
        }
    }

    #[tracing::instrument(name = "Looking up newsletter subscriber by email", skip_all)]
    async fn find_newsletter_subscriber_by_email(
        &self,
        email: &SubmissionEmail,
    ) -> Result<Option<NewsletterSubscriber>, StoreError> {
        let collection = Collection::NewsletterSubscribers;
        sqlx::query_as::<_, NewsletterSubscriberRow>(
            r#"
            SELECT id, name, email, subscribed_at FROM newsletter_subscribers
            WHERE email = $1
            "#,
        )
        .bind(email.as_ref())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| classify(collection, e))?
        .map(|row| row.try_into().map_err(|e| invalid_row(collection, e)))
        .transpose()
    }

    #[tracing::instrument(name = "Looking up contact submission by id", skip(self))]
    async fn find_contact_submission_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<ContactSubmission>, StoreError> {
        let collection = Collection::ContactSubmissions;
        sqlx::query_as::<_, ContactSubmissionRow>(
            r#"
            SELECT id, name, email, project, message, received_at FROM contact_submissions
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| classify(collection, e))?
        .map(|row| row.try_into().map_err(|e| invalid_row(collection, e)))
        .transpose()
    }
}
