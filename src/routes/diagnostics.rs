use actix_web::http::StatusCode;
use actix_web::{HttpResponse, web};
use serde_json::{Value, json};

use crate::configuration::EmailClientSettings;
use crate::domain::validation::{sanitize, sanitize_email};
use crate::domain::{CatalogueAsset, ContactSubmission, SubmissionEmail};
use crate::notifier::{EmailDispatchResult, Notification, Notifier};
use crate::telemetry::mask_email;
use crate::utils::json_error;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

#[derive(Debug, Default, serde::Deserialize)]
pub struct ConfirmationProbe {
    #[serde(default)]
    pub email: Option<Value>,
    #[serde(default)]
    pub name: Option<Value>,
}

#[derive(Debug, Default, serde::Deserialize)]
pub struct CatalogueProbe {
    #[serde(default)]
    pub email: Option<Value>,
}

fn presence(set: bool) -> &'static str {
    if set { "Set" } else { "Missing" }
}

/// Requested address, else the SMTP login, else `test@example.com`.
fn probe_recipient(requested: Option<&Value>, settings: &EmailClientSettings) -> String {
    Some(sanitize_email(requested))
        .filter(|e| !e.is_empty())
        .or_else(|| settings.username.clone())
        .unwrap_or_else(|| "test@example.com".to_string())
}

/// Check that the SMTP server accepts the configured credentials.
#[tracing::instrument(name = "Verify the SMTP connection", skip(notifier, settings))]
pub async fn verify_mail_transport(
    notifier: web::Data<Notifier>,
    settings: web::Data<EmailClientSettings>,
) -> HttpResponse {
    match notifier.verify_connection().await {
        Ok(()) => HttpResponse::Ok().json(json!({
            "success": true,
            "message": "SMTP connection successful!",
            "config": {
                "host": settings.host,
                "port": settings.port,
                "email": presence(settings.username.is_some()),
                "password": presence(settings.password.is_some()),
            }
        })),
        Err(e) => {
            tracing::error!(error = %e, "SMTP connection check failed");
            HttpResponse::InternalServerError().json(json!({
                "success": false,
                "error": e.message,
                "errorType": e.kind.error_type(),
            }))
        }
    }
}

/// Send a sample contact confirmation without storing anything.
#[tracing::instrument(name = "Send a test contact confirmation", skip(notifier, settings, body))]
pub async fn send_test_contact_confirmation(
    notifier: web::Data<Notifier>,
    settings: web::Data<EmailClientSettings>,
    body: Option<web::Json<ConfirmationProbe>>,
) -> HttpResponse {
    let probe = body.map(web::Json::into_inner).unwrap_or_default();
    let email = probe_recipient(probe.email.as_ref(), &settings);
    let name = Some(sanitize(probe.name.as_ref()))
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| "Test User".to_string());

    let submission = match ContactSubmission::new(
        name,
        email.to_lowercase(),
        "Test Project".to_string(),
        "This is a test email to verify the confirmation email system is working.".to_string(),
    ) {
        Ok(submission) => submission,
        Err(message) => return json_error(StatusCode::BAD_REQUEST, &message, None),
    };

    match notifier
        .send(Notification::ContactConfirmation(&submission))
        .await
    {
        EmailDispatchResult::Sent { message_id } => HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Test confirmation email sent successfully!",
            "details": {
                "to": submission.email.as_ref(),
                "messageId": message_id,
            }
        })),
        EmailDispatchResult::Failed(e) => HttpResponse::InternalServerError().json(json!({
            "success": false,
            "error": e.message,
            "errorType": e.kind.error_type(),
            "smtpConfig": {
                "host": settings.host,
                "port": settings.port,
                "email": presence(settings.username.is_some()),
                "password": presence(settings.password.is_some()),
            }
        })),
    }
}

/// Email the catalogue to a test address and report on the SMTP settings and
/// the catalogue file.
#[tracing::instrument(name = "Send a test catalogue email", skip(notifier, settings, catalogue, body))]
pub async fn send_test_catalogue_email(
    notifier: web::Data<Notifier>,
    settings: web::Data<EmailClientSettings>,
    catalogue: web::Data<CatalogueAsset>,
    body: Option<web::Json<CatalogueProbe>>,
) -> HttpResponse {
    let probe = body.map(web::Json::into_inner).unwrap_or_default();
    let recipient = match SubmissionEmail::parse(probe_recipient(probe.email.as_ref(), &settings)) {
        Ok(recipient) => recipient,
        Err(message) => return json_error(StatusCode::BAD_REQUEST, &message, None),
    };
    let size = match catalogue.size().await {
        Ok(size) => size,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to inspect the catalogue file");
            None
        }
    };
    let path = catalogue.path.display().to_string();
    let smtp_email = settings
        .username
        .as_deref()
        .map(mask_email)
        .unwrap_or_else(|| "N/A".to_string());

    match notifier
        .send(Notification::CatalogueDelivery {
            recipient: &recipient,
            catalogue: catalogue.get_ref(),
        })
        .await
    {
        EmailDispatchResult::Sent { message_id } => {
            let bytes = size.unwrap_or_default();
            HttpResponse::Ok().json(json!({
                "success": true,
                "message": "Catalogue email test successful!",
                "testEmail": recipient.as_ref(),
                "messageId": message_id,
                "smtpConfig": {
                    "host": settings.host,
                    "port": settings.port,
                    "email": smtp_email,
                    "password": "Hidden",
                },
                "catalogueFile": {
                    "path": path,
                    "exists": size.is_some(),
                    "size": bytes,
                    "sizeMB": format!("{:.2}", bytes as f64 / BYTES_PER_MB),
                }
            }))
        }
        EmailDispatchResult::Failed(e) => HttpResponse::InternalServerError().json(json!({
            "success": false,
            "error": e.message,
            "errorType": e.kind.error_type(),
            "testEmail": recipient.as_ref(),
            "diagnostics": {
                "smtpConfig": {
                    "host": settings.host,
                    "port": settings.port,
                    "email": smtp_email,
                    "password": presence(settings.password.is_some()),
                },
                "catalogueFile": {
                    "path": path,
                    "exists": size.is_some(),
                }
            }
        })),
    }
}
