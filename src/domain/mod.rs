mod catalogue_asset;
mod contact_submission;
mod newsletter_subscriber;
mod submission_email;
pub mod validation;

pub use catalogue_asset::{CatalogueAsset, MAX_ATTACHMENT_BYTES};
pub use contact_submission::{ContactSubmission, INVALID_EMAIL, MISSING_CONTACT_FIELDS};
pub use newsletter_subscriber::{
    INVALID_SUBSCRIBER_EMAIL, MISSING_SUBSCRIBER_EMAIL, NewsletterSubscriber,
};
pub use submission_email::SubmissionEmail;
