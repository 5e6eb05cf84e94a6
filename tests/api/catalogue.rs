use serde_json::{Value, json};

use crate::helpers::{CATALOGUE_CONTENT, Failure, spawn_app, spawn_app_without_mail_transport};

#[actix_web::test]
async fn the_catalogue_is_emailed_as_a_pdf_attachment() {
    // Arrange
    let app = spawn_app().await;

    // Act
    let response = app
        .post_catalogue_email(&json!({"email": " Buyer@Example.com "}))
        .await;

    // Assert
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(
        body,
        json!({
            "success": true,
            "message": "Catalogue sent successfully! Please check your email inbox.",
        })
    );
    let sent = app.mail.sent_to("buyer@example.com");
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].subject, "Your ARCHIKMOR Catalogue 2026");
    let attachment = sent[0].attachment.as_ref().expect("No attachment was sent.");
    assert_eq!(attachment.filename, "ARCHIKMOR-Catalogue-2026.pdf");
    assert_eq!(attachment.content_type, "application/pdf");
    assert_eq!(attachment.content, CATALOGUE_CONTENT);
    // Nobody else is emailed.
    assert_eq!(app.mail.sent().len(), 1);
}

#[actix_web::test]
async fn catalogue_email_returns_400_for_invalid_data() {
    let app = spawn_app().await;
    let test_cases = vec![
        (json!({}), "Email address is required.", "missing email"),
        (json!({"email": ""}), "Email address is required.", "empty email"),
        (json!({"email": "buyer"}), "Please provide a valid email address.", "invalid email"),
    ];

    for (body, expected_error, description) in test_cases {
        let response = app.post_catalogue_email(&body).await;

        assert_eq!(
            response.status().as_u16(),
            400,
            "The API did not fail with 400 Bad Request when the payload was {}.",
            description
        );
        let body: Value = response.json().await.unwrap();
        assert_eq!(body, json!({"error": expected_error}), "{}", description);
    }
    assert!(app.mail.sent().is_empty());
}

#[actix_web::test]
async fn catalogue_email_returns_503_without_a_mail_transport() {
    let app = spawn_app_without_mail_transport().await;

    let response = app.post_catalogue_email(&json!({"email": "buyer@example.com"})).await;

    assert_eq!(response.status().as_u16(), 503);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["errorType"], "smtp_config_missing");
    assert_eq!(
        body["error"],
        "Email service is currently unavailable. Please try downloading the catalogue directly or contact us for assistance."
    );
}

#[actix_web::test]
async fn catalogue_email_returns_404_when_the_file_is_missing() {
    let app = spawn_app().await;
    app.remove_catalogue();

    let response = app.post_catalogue_email(&json!({"email": "buyer@example.com"})).await;

    assert_eq!(response.status().as_u16(), 404);
    let body: Value = response.json().await.unwrap();
    // The server-side path is never exposed.
    assert_eq!(
        body,
        json!({
            "error": "Catalogue file not found. Please contact support.",
            "errorType": "file_not_found",
        })
    );
    assert!(app.mail.sent().is_empty());
}

#[actix_web::test]
async fn transport_failures_are_tagged_with_their_category() {
    let test_cases = vec![
        (
            Failure::Authentication,
            "smtp_authentication_failed",
            Some("Email service authentication failed. Please check SMTP configuration."),
        ),
        (
            Failure::Connection,
            "smtp_connection_failed",
            Some("Cannot connect to email server. Please check network and SMTP settings."),
        ),
        (Failure::Rejected, "smtp_error", None),
    ];

    for (failure, expected_type, expected_message) in test_cases {
        let app = spawn_app().await;
        app.mail.fail_for("buyer@example.com", failure);

        let response = app.post_catalogue_email(&json!({"email": "buyer@example.com"})).await;

        assert_eq!(response.status().as_u16(), 500, "{:?}", failure);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["errorType"], expected_type, "{:?}", failure);
        assert_eq!(body.as_object().unwrap().len(), 2, "{:?}", failure);
        if let Some(message) = expected_message {
            assert_eq!(body["error"], message, "{:?}", failure);
        } else {
            assert!(body["error"].as_str().unwrap().starts_with("Email service error:"));
        }
    }
}

#[actix_web::test]
async fn the_catalogue_can_be_downloaded() {
    let app = spawn_app().await;

    let response = app.get("/api/catalogue/download").await;

    assert_eq!(response.status().as_u16(), 200);
    let headers = response.headers();
    assert_eq!(headers["content-type"], "application/pdf");
    assert_eq!(
        headers["content-disposition"],
        "attachment; filename=\"Archikmor-Catalog2026.pdf\""
    );
    assert_eq!(headers["cache-control"], "no-cache");
    let bytes = response.bytes().await.unwrap();
    assert_eq!(bytes.as_ref(), CATALOGUE_CONTENT);
}

#[actix_web::test]
async fn downloading_a_missing_catalogue_returns_404() {
    let app = spawn_app().await;
    app.remove_catalogue();

    let response = app.get("/api/catalogue/download").await;

    assert_eq!(response.status().as_u16(), 404);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({"error": "Catalogue file not found"}));
}
