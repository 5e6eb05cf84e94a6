use serde_json::{Value, json};

use crate::helpers::{Failure, TestApp, spawn_app, spawn_app_without_mail_transport};

async fn stored_subscribers(app: &TestApp) -> Vec<(Option<String>, String)> {
    sqlx::query_as("SELECT name, email FROM newsletter_subscribers")
        .fetch_all(&app.db_pool)
        .await
        .expect("Failed to fetch newsletter subscribers.")
}

#[actix_web::test]
async fn subscribe_returns_201_for_a_new_subscriber() {
    // Arrange
    let app = spawn_app().await;

    // Act
    let response = app
        .post_newsletter(&json!({"name": "Reader", "email": "Reader@Example.com"}))
        .await;

    // Assert
    assert_eq!(response.status().as_u16(), 201);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["emailStatus"], "success");
    assert_eq!(body["emailSent"], true);
    assert_eq!(
        stored_subscribers(&app).await,
        vec![(Some("Reader".to_string()), "reader@example.com".to_string())]
    );
}

#[actix_web::test]
async fn subscribe_sends_a_welcome_and_a_studio_notification() {
    let app = spawn_app().await;

    app.post_newsletter(&json!({"email": "reader@example.com"})).await;

    let welcome = app.mail.sent_to("reader@example.com");
    assert_eq!(welcome.len(), 1);
    assert_eq!(welcome[0].subject, "Welcome to ARCHIKMOR Newsletter!");
    let staff = app.mail.sent_to(&app.notification_email);
    assert_eq!(staff.len(), 1);
    assert_eq!(staff[0].subject, "New Newsletter Subscription: reader@example.com");
}

#[actix_web::test]
async fn subscribing_twice_returns_200_without_sending_emails() {
    // Arrange
    let app = spawn_app().await;
    app.post_newsletter(&json!({"email": "reader@example.com"})).await;
    let sent_before = app.mail.sent().len();

    // Act
    let response = app
        .post_newsletter(&json!({"name": "Someone", "email": "  READER@example.COM "}))
        .await;

    // Assert
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(
        body,
        json!({
            "success": true,
            "message": "You are already subscribed. Thank you for staying in touch!",
        })
    );
    assert_eq!(stored_subscribers(&app).await.len(), 1);
    assert_eq!(app.mail.sent().len(), sent_before);
}

#[actix_web::test]
async fn concurrent_identical_subscriptions_store_one_subscriber() {
    let app = spawn_app().await;
    let body = json!({"email": "reader@example.com"});

    let (first, second) =
        futures::join!(app.post_newsletter(&body), app.post_newsletter(&body));

    let mut statuses = vec![first.status().as_u16(), second.status().as_u16()];
    statuses.sort();
    assert_eq!(statuses, vec![200, 201]);
    assert_eq!(stored_subscribers(&app).await.len(), 1);
    assert_eq!(app.mail.sent_to("reader@example.com").len(), 1);
}

#[actix_web::test]
async fn subscribe_returns_400_for_invalid_data() {
    let app = spawn_app().await;
    let test_cases = vec![
        (json!({"name": "Reader"}), "Email is required to subscribe.", "missing email"),
        (json!({"email": "   "}), "Email is required to subscribe.", "blank email"),
        (json!({"email": 42}), "Email is required to subscribe.", "non-string email"),
        (json!({"email": "reader@"}), "Please enter a valid email address.", "invalid email"),
    ];

    for (body, expected_error, description) in test_cases {
        let response = app.post_newsletter(&body).await;

        assert_eq!(
            response.status().as_u16(),
            400,
            "The API did not fail with 400 Bad Request when the payload was {}.",
            description
        );
        let body: Value = response.json().await.unwrap();
        assert_eq!(body, json!({"error": expected_error}), "{}", description);
    }
    assert!(stored_subscribers(&app).await.is_empty());
}

#[actix_web::test]
async fn subscribe_returns_400_for_malformed_json() {
    let app = spawn_app().await;

    let response = app.post_raw("/api/newsletter", "not json").await;

    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].is_string());
}

#[actix_web::test]
async fn a_failed_welcome_email_still_subscribes() {
    let app = spawn_app().await;
    app.mail.fail_for("reader@example.com", Failure::Authentication);

    let response = app.post_newsletter(&json!({"email": "reader@example.com"})).await;

    assert_eq!(response.status().as_u16(), 201);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["emailStatus"], "failed");
    assert_eq!(body["emailSent"], false);
    assert_eq!(stored_subscribers(&app).await.len(), 1);
}

#[actix_web::test]
async fn subscribe_without_a_mail_transport_reports_unavailable() {
    let app = spawn_app_without_mail_transport().await;

    let response = app.post_newsletter(&json!({"email": "reader@example.com"})).await;

    assert_eq!(response.status().as_u16(), 201);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["emailStatus"], "unavailable");
    assert_eq!(body["emailSent"], false);
    assert_eq!(stored_subscribers(&app).await.len(), 1);
}

#[actix_web::test]
async fn subscribe_fails_with_500_if_there_is_a_fatal_database_error() {
    let app = spawn_app().await;
    // Sabotage the database
    sqlx::query("ALTER TABLE newsletter_subscribers DROP COLUMN subscribed_at;")
        .execute(&app.db_pool)
        .await
        .unwrap();

    let response = app.post_newsletter(&json!({"email": "reader@example.com"})).await;

    assert_eq!(response.status().as_u16(), 500);
    let body: Value = response.json().await.unwrap();
    assert_eq!(
        body,
        json!({"error": "Unable to subscribe right now. Please try again later."})
    );
    assert!(app.mail.sent().is_empty());
}
