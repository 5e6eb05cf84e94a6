//! One-off import of the JSON files the site used before it had a database.

use std::path::Path;

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::Value;
use uuid::Uuid;

use crate::domain::{ContactSubmission, NewsletterSubscriber, SubmissionEmail};
use crate::store::{InsertOutcome, RecordStore};
use crate::telemetry::mask_email;

pub const CONTACT_SUBMISSIONS_FILE: &str = "contact-submissions.json";
pub const NEWSLETTER_SUBSCRIBERS_FILE: &str = "newsletter-subscribers.json";

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyContactSubmission {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub project: Option<String>,
    pub message: String,
    pub received_at: DateTime<Utc>,
}

impl TryFrom<LegacyContactSubmission> for ContactSubmission {
    type Error = String;

    fn try_from(legacy: LegacyContactSubmission) -> Result<Self, Self::Error> {
        Ok(Self {
            id: legacy.id,
            name: legacy.name,
            email: SubmissionEmail::parse(legacy.email)?,
            project: legacy.project.filter(|p| !p.trim().is_empty()),
            message: legacy.message,
            received_at: legacy.received_at,
        })
    }
}

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyNewsletterSubscriber {
    pub id: Uuid,
    #[serde(default)]
    pub name: Option<String>,
    pub email: String,
    pub subscribed_at: DateTime<Utc>,
}

impl TryFrom<LegacyNewsletterSubscriber> for NewsletterSubscriber {
    type Error = String;

    fn try_from(legacy: LegacyNewsletterSubscriber) -> Result<Self, Self::Error> {
        Ok(Self {
            id: legacy.id,
            name: legacy.name.filter(|n| !n.trim().is_empty()),
            email: SubmissionEmail::parse(legacy.email)?,
            subscribed_at: legacy.subscribed_at,
        })
    }
}

/// Per-collection import counts.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImportReport {
    pub migrated: usize,
    pub skipped: usize,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub contact_submissions: ImportReport,
    pub newsletter_subscribers: ImportReport,
}

/// Import both legacy files found in `directory`. Missing files count as empty.
pub async fn import_directory(
    store: &dyn RecordStore,
    directory: &Path,
) -> Result<ImportSummary, anyhow::Error> {
    let submissions = read_legacy_file(&directory.join(CONTACT_SUBMISSIONS_FILE)).await?;
    let subscribers = read_legacy_file(&directory.join(NEWSLETTER_SUBSCRIBERS_FILE)).await?;
    Ok(ImportSummary {
        contact_submissions: import_contact_submissions(store, submissions).await,
        newsletter_subscribers: import_newsletter_subscribers(store, subscribers).await,
    })
}

/// Read a JSON array, one raw value per record.
pub async fn read_legacy_file(path: &Path) -> Result<Vec<Value>, anyhow::Error> {
    let contents = match tokio::fs::read_to_string(path).await {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!(path = %path.display(), "Legacy file not found, skipping");
            return Ok(Vec::new());
        }
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to read {}", path.display()));
        }
    };
    let parsed: Value = serde_json::from_str(&contents)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;
    Ok(match parsed {
        Value::Array(records) => records,
        _ => Vec::new(),
    })
}

fn parse_record<Legacy, T>(raw: Value) -> Result<T, String>
where
    Legacy: DeserializeOwned,
    T: TryFrom<Legacy, Error = String>,
{
    let legacy: Legacy = serde_json::from_value(raw).map_err(|e| e.to_string())?;
    T::try_from(legacy)
}

#[tracing::instrument(name = "Import legacy contact submissions", skip_all)]
pub async fn import_contact_submissions(store: &dyn RecordStore, records: Vec<Value>) -> ImportReport {
    let mut report = ImportReport::default();
    for raw in records {
        let submission: ContactSubmission =
            match parse_record::<LegacyContactSubmission, _>(raw) {
                Ok(submission) => submission,
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping an unreadable contact submission");
                    report.skipped += 1;
                    continue;
                }
            };
        match store.find_contact_submission_by_id(submission.id).await {
            Ok(Some(_)) => {
                tracing::info!(id = %submission.id, "Skipping duplicate submission");
                report.skipped += 1;
                continue;
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(error.cause_chain = ?e, "Failed to check for an existing submission");
            }
        }
        match store.insert_contact_submission(&submission).await {
            Ok(_) => report.migrated += 1,
            Err(e) => {
                tracing::error!(id = %submission.id, error.cause_chain = ?e, "Failed to migrate submission");
                report.skipped += 1;
            }
        }
    }
    tracing::info!(migrated = report.migrated, skipped = report.skipped, "Contact submissions imported");
    report
}

#[tracing::instrument(name = "Import legacy newsletter subscribers", skip_all)]
pub async fn import_newsletter_subscribers(store: &dyn RecordStore, records: Vec<Value>) -> ImportReport {
    let mut report = ImportReport::default();
    for raw in records {
        let subscriber: NewsletterSubscriber =
            match parse_record::<LegacyNewsletterSubscriber, _>(raw) {
                Ok(subscriber) => subscriber,
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping an unreadable newsletter subscriber");
                    report.skipped += 1;
                    continue;
                }
            };
        let email = mask_email(subscriber.email.as_ref());
        match store.find_newsletter_subscriber_by_email(&subscriber.email).await {
            Ok(Some(_)) => {
                tracing::info!(%email, "Skipping duplicate subscriber");
                report.skipped += 1;
                continue;
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(error.cause_chain = ?e, "Failed to check for an existing subscriber");
            }
        }
        match store.insert_newsletter_subscriber(&subscriber).await {
            Ok(InsertOutcome::Inserted(_)) => report.migrated += 1,
            Ok(InsertOutcome::AlreadyExists) => {
                tracing::info!(%email, "Skipping duplicate subscriber (unique constraint)");
                report.skipped += 1;
            }
            Err(e) => {
                tracing::error!(%email, error.cause_chain = ?e, "Failed to migrate subscriber");
                report.skipped += 1;
            }
        }
    }
    tracing::info!(migrated = report.migrated, skipped = report.skipped, "Newsletter subscribers imported");
    report
}
