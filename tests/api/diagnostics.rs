use serde_json::{Value, json};

use crate::helpers::{
    CATALOGUE_CONTENT, Failure, spawn_app, spawn_app_without_diagnostics, spawn_app_without_mail_transport,
};

#[actix_web::test]
async fn test_email_reports_a_working_transport() {
    let app = spawn_app().await;

    let response = app.get("/api/test-email").await;

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "SMTP connection successful!");
    assert!(body["config"]["host"].is_string());
}

#[actix_web::test]
async fn test_email_fails_without_a_mail_transport() {
    let app = spawn_app_without_mail_transport().await;

    let response = app.get("/api/test-email").await;

    assert_eq!(response.status().as_u16(), 500);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["errorType"], "smtp_config_missing");
}

#[actix_web::test]
async fn test_contact_confirmation_is_sent_but_not_stored() {
    let app = spawn_app().await;

    let response = app
        .post_json(
            "/api/test-contact-confirmation",
            &json!({"email": "Probe@Example.com"}),
        )
        .await;

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["details"]["to"], "probe@example.com");
    assert!(body["details"]["messageId"].is_string());

    let sent = app.mail.sent_to("probe@example.com");
    assert_eq!(sent.len(), 1);
    assert!(sent[0].text_body.contains("Test User"));
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM contact_submissions")
        .fetch_one(&app.db_pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[actix_web::test]
async fn a_failed_test_contact_confirmation_returns_500() {
    let app = spawn_app().await;
    app.mail.fail_for("probe@example.com", Failure::Connection);

    let response = app
        .post_json("/api/test-contact-confirmation", &json!({"email": "probe@example.com"}))
        .await;

    assert_eq!(response.status().as_u16(), 500);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["errorType"], "smtp_connection_failed");
}

#[actix_web::test]
async fn diagnostic_routes_are_absent_when_disabled() {
    let app = spawn_app_without_diagnostics().await;

    let verify = app.get("/api/test-email").await;
    let probe = app
        .post_json("/api/test-contact-confirmation", &json!({"email": "probe@example.com"}))
        .await;

    let catalogue = app
        .post_json("/api/test-catalogue-email", &json!({"email": "probe@example.com"}))
        .await;

    assert_eq!(verify.status().as_u16(), 404);
    assert_eq!(probe.status().as_u16(), 404);
    assert_eq!(catalogue.status().as_u16(), 404);
    assert!(app.mail.sent().is_empty());
}

#[actix_web::test]
async fn test_catalogue_email_sends_the_catalogue_and_reports_the_file() {
    let app = spawn_app().await;

    let response = app
        .post_json("/api/test-catalogue-email", &json!({"email": "Buyer@Example.com"}))
        .await;

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Catalogue email test successful!");
    assert_eq!(body["testEmail"], "buyer@example.com");
    assert_eq!(body["smtpConfig"]["password"], "Hidden");
    assert_eq!(body["catalogueFile"]["exists"], true);
    assert_eq!(body["catalogueFile"]["size"], CATALOGUE_CONTENT.len() as u64);
    assert_eq!(body["catalogueFile"]["sizeMB"], "0.00");
    assert_eq!(
        body["catalogueFile"]["path"],
        app.catalogue_path.display().to_string()
    );

    let sent = app.mail.sent_to("buyer@example.com");
    assert_eq!(sent.len(), 1);
    assert_eq!(
        sent[0].attachment.as_ref().unwrap().content,
        CATALOGUE_CONTENT
    );
}

#[actix_web::test]
async fn test_catalogue_email_reports_a_missing_file() {
    let app = spawn_app().await;
    app.remove_catalogue();

    let response = app
        .post_json("/api/test-catalogue-email", &json!({"email": "buyer@example.com"}))
        .await;

    assert_eq!(response.status().as_u16(), 500);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["errorType"], "file_not_found");
    assert_eq!(body["testEmail"], "buyer@example.com");
    assert_eq!(body["diagnostics"]["catalogueFile"]["exists"], false);
    assert!(app.mail.sent().is_empty());
}

#[actix_web::test]
async fn test_catalogue_email_reports_transport_failures() {
    let app = spawn_app().await;
    app.mail.fail_for("buyer@example.com", Failure::Authentication);

    let response = app
        .post_json("/api/test-catalogue-email", &json!({"email": "buyer@example.com"}))
        .await;

    assert_eq!(response.status().as_u16(), 500);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["errorType"], "smtp_authentication_failed");
    assert_eq!(body["diagnostics"]["catalogueFile"]["exists"], true);
}
