
use std::{sync::Arc, time::Duration};

use parking_lot::Mutex;
use portfolio_api::{email::EmailError, settings::AppConfig};
use reqwest::{Method, StatusCode};
use serde_json::json;
use test_utils::*;

/// Mailer that fails every send and records the attempted subjects.
fn failing_mailer() -> (MockSmtp, Arc<Mutex<Vec<(String, String)>>>) {
    let sent = Arc::new(Mutex::new(Vec::new()));
    let recorder = sent.clone();

    let mut mailer = MockSmtp::new();
    mailer.expect_send().returning(move |email| {
        recorder.lock().push((email.to.clone(), email.subject.clone()));
        Err(EmailError::Transport("connection refused".into()))
    });

    (mailer, sent)
}

async fn wait_for_sends(sent: &Arc<Mutex<Vec<(String, String)>>>, expected: usize) {
    for _ in 0..100 {
        if sent.lock().len() >= expected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

#[actix_rt::test]
async fn submission_succeeds_even_when_mail_fails() {
    let (mailer, sent) = failing_mailer();
    let app = TestApp::spawn_with(test_config(), Arc::new(mailer)).await;

    let (status, body) = app.send_json(Method::POST, "/api/contact", &valid_contact()).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Message sent successfully! I'll get back to you soon.");
    assert!(body["data"]["id"].is_string());
    assert!(body["data"]["createdAt"].is_string());

    wait_for_sends(&sent, 2).await;
    let mut sent = sent.lock().clone();
    sent.sort();
    assert_eq!(
        sent,
        vec![
            ("ada@example.com".to_string(), "Thanks for reaching out!".to_string()),
            ("owner@example.com".to_string(), "New Contact Form: Project inquiry".to_string()),
        ]
    );
}

#[actix_rt::test]
async fn invalid_submission_lists_field_errors() {
    let app = TestApp::spawn().await;

    let body = json!({ "name": "A", "email": "nope", "subject": "Hi", "message": "short" });
    let (status, response) = app.send_json(Method::POST, "/api/contact", &body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let fields: Vec<&str> = response["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["email", "message", "name", "subject"]);
}

#[actix_rt::test]
async fn submissions_are_rate_limited_per_client() {
    let config = AppConfig { contact_rate_limit: 2, ..test_config() };
    let app = TestApp::spawn_with(config, Arc::new(portfolio_api::email::LogMailer)).await;

    for _ in 0..2 {
        let (status, _) = app.send_json(Method::POST, "/api/contact", &valid_contact()).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let response = app
        .client
        .post(app.url("/api/contact"))
        .json(&valid_contact())
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(response.headers().contains_key("retry-after"));
}

#[actix_rt::test]
async fn submissions_are_unlimited_by_default() {
    let app = TestApp::spawn().await;
    assert!(app.state.limiter().is_none());

    for _ in 0..6 {
        let (status, body) = app.send_json(Method::POST, "/api/contact", &valid_contact()).await;
        assert_eq!(status, StatusCode::CREATED);
        assert!(body["data"]["id"].is_string());
    }
}

#[actix_rt::test]
async fn inbox_administration_flow() {
    let app = TestApp::spawn().await;

    let (_, created) = app.send_json(Method::POST, "/api/contact", &valid_contact()).await;
    let id = created["data"]["id"].as_str().unwrap().to_string();
    let path = format!("/api/contact/{}", id);

    let (_, listed) = app.get_json("/api/contact?status=new").await;
    assert_eq!(listed["total"], 1);

    let (status, opened) = app.get_json(&path).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(opened["data"]["status"], "read");
    assert_eq!(opened["data"]["email"], "ada@example.com");

    let (status, replied) = app
        .send_json(Method::PATCH, &path, &json!({ "status": "replied", "notes": "Sent a quote" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(replied["data"]["replied"], true);
    assert!(replied["data"]["repliedAt"].is_string());

    let (_, stats) = app.get_json("/api/contact/stats").await;
    assert_eq!(stats["data"]["total"], 1);
    assert_eq!(stats["data"]["today"], 1);
    assert_eq!(stats["data"]["byStatus"]["replied"], 1);

    let (status, deleted) = app.send_json(Method::DELETE, &path, &json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["message"], "Contact message deleted successfully");

    let (status, missing) = app.get_json(&path).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(missing["message"], "Contact message not found");
}

#[actix_rt::test]
async fn invalid_status_patch_is_rejected() {
    let app = TestApp::spawn().await;

    let (_, created) = app.send_json(Method::POST, "/api/contact", &valid_contact()).await;
    let path = format!("/api/contact/{}", created["data"]["id"].as_str().unwrap());

    let (status, _) = app.send_json(Method::PATCH, &path, &json!({ "status": "spam" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
