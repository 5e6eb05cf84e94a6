use fake::Fake;
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::Name;
use serde_json::{Value, json};

use crate::helpers::{Failure, TestApp, spawn_app, spawn_app_without_mail_transport};

fn valid_body() -> Value {
    let name: String = Name().fake();
    let email: String = SafeEmail().fake();
    json!({
        "name": name,
        "email": email,
        "project": "Kitchen",
        "message": "We would like a new kitchen.",
    })
}

async fn stored_submissions(app: &TestApp) -> Vec<(String, String, Option<String>, String)> {
    sqlx::query_as("SELECT name, email, project, message FROM contact_submissions")
        .fetch_all(&app.db_pool)
        .await
        .expect("Failed to fetch contact submissions.")
}

#[actix_web::test]
async fn contact_returns_201_and_stores_the_submission() {
    // Arrange
    let app = spawn_app().await;
    let body = json!({
        "name": "  Jane Doe ",
        "email": " Jane.Doe@Example.COM ",
        "project": "Kitchen",
        "message": "We would like a new kitchen.",
    });

    // Act
    let response = app.post_contact(&body).await;

    // Assert
    assert_eq!(response.status().as_u16(), 201);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["emailStatus"], "success");
    assert_eq!(body["emailSent"], true);

    let saved = stored_submissions(&app).await;
    assert_eq!(saved.len(), 1);
    let (name, email, project, message) = &saved[0];
    assert_eq!(name, "Jane Doe");
    assert_eq!(email, "jane.doe@example.com");
    assert_eq!(project.as_deref(), Some("Kitchen"));
    assert_eq!(message, "We would like a new kitchen.");
}

#[actix_web::test]
async fn contact_notifies_the_studio_and_confirms_to_the_submitter() {
    let app = spawn_app().await;
    let body = json!({
        "name": "Jane Doe",
        "email": "jane@example.com",
        "message": "Hello <there>",
    });

    app.post_contact(&body).await;

    let sent = app.mail.sent();
    assert_eq!(sent.len(), 2);
    let staff = app.mail.sent_to(&app.notification_email);
    assert_eq!(staff.len(), 1);
    assert_eq!(staff[0].subject, "New Contact Form Submission from Jane Doe");
    assert!(staff[0].html_body.contains("Hello &lt;there&gt;"));
    let confirmation = app.mail.sent_to("jane@example.com");
    assert_eq!(confirmation.len(), 1);
    assert_eq!(confirmation[0].subject, "Thank You for Contacting ARCHIKMOR");
}

#[actix_web::test]
async fn contact_without_a_project_stores_null() {
    let app = spawn_app().await;
    let body = json!({
        "name": "Jane",
        "email": "jane@example.com",
        "project": "   ",
        "message": "Hi",
    });

    let response = app.post_contact(&body).await;

    assert_eq!(response.status().as_u16(), 201);
    let saved = stored_submissions(&app).await;
    assert_eq!(saved[0].2, None);
}

#[actix_web::test]
async fn contact_returns_400_for_invalid_data() {
    // Arrange
    let app = spawn_app().await;
    let test_cases = vec![
        (
            json!({"email": "jane@example.com", "message": "Hi"}),
            "Missing required fields. Please provide name, email, and message.",
            "missing the name",
        ),
        (
            json!({"name": "Jane", "message": "Hi"}),
            "Missing required fields. Please provide name, email, and message.",
            "missing the email",
        ),
        (
            json!({"name": "Jane", "email": "jane@example.com", "message": "   "}),
            "Missing required fields. Please provide name, email, and message.",
            "blank message",
        ),
        (
            json!({"name": 7, "email": "jane@example.com", "message": "Hi"}),
            "Missing required fields. Please provide name, email, and message.",
            "non-string name",
        ),
        (
            json!({"name": "Jane", "email": "not-an-email", "message": "Hi"}),
            "Please provide a valid email address.",
            "invalid email",
        ),
    ];

    for (body, expected_error, description) in test_cases {
        // Act
        let response = app.post_contact(&body).await;

        // Assert
        assert_eq!(
            response.status().as_u16(),
            400,
            "The API did not fail with 400 Bad Request when the payload was {}.",
            description
        );
        let body: Value = response.json().await.unwrap();
        assert_eq!(body, json!({"error": expected_error}), "{}", description);
    }
    assert!(stored_submissions(&app).await.is_empty());
    assert!(app.mail.sent().is_empty());
}

#[actix_web::test]
async fn contact_returns_400_for_malformed_json() {
    let app = spawn_app().await;

    let response = app.post_raw("/api/contact", "{\"name\": \"Jane\",").await;

    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].is_string());
    assert!(stored_submissions(&app).await.is_empty());
}

#[actix_web::test]
async fn a_failed_confirmation_is_reported_but_the_submission_is_kept() {
    let app = spawn_app().await;
    app.mail.fail_for("jane@example.com", Failure::Rejected);

    let response = app
        .post_contact(&json!({"name": "Jane", "email": "jane@example.com", "message": "Hi"}))
        .await;

    assert_eq!(response.status().as_u16(), 201);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["emailStatus"], "failed");
    assert_eq!(body["emailSent"], false);
    assert_eq!(stored_submissions(&app).await.len(), 1);
    // The studio is still told about the enquiry.
    assert_eq!(app.mail.sent_to(&app.notification_email).len(), 1);
}

#[actix_web::test]
async fn a_failed_studio_notification_does_not_change_the_response() {
    let app = spawn_app().await;
    let notification_email = app.notification_email.clone();
    app.mail.fail_for(&notification_email, Failure::Connection);

    let response = app.post_contact(&valid_body()).await;

    assert_eq!(response.status().as_u16(), 201);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["emailStatus"], "success");
    assert_eq!(body["emailSent"], true);
}

#[actix_web::test]
async fn contact_without_a_mail_transport_is_stored_and_reports_unavailable() {
    let app = spawn_app_without_mail_transport().await;

    let response = app.post_contact(&valid_body()).await;

    assert_eq!(response.status().as_u16(), 201);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["emailStatus"], "unavailable");
    assert_eq!(body["emailSent"], false);
    assert!(
        body["message"]
            .as_str()
            .unwrap()
            .contains("email notifications are currently unavailable")
    );
    assert_eq!(stored_submissions(&app).await.len(), 1);
}

#[actix_web::test]
async fn contact_fails_with_500_and_sends_nothing_if_there_is_a_fatal_database_error() {
    // Arrange
    let app = spawn_app().await;
    // Sabotage the database
    sqlx::query("ALTER TABLE contact_submissions DROP COLUMN message;")
        .execute(&app.db_pool)
        .await
        .unwrap();

    // Act
    let response = app.post_contact(&valid_body()).await;

    // Assert
    assert_eq!(response.status().as_u16(), 500);
    let body: Value = response.json().await.unwrap();
    assert_eq!(
        body,
        json!({"error": "Unable to save your request right now. Please try again later."})
    );
    assert!(app.mail.sent().is_empty());
}
