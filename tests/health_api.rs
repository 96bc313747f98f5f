
use std::{sync::Arc, time::Duration};

use portfolio_api::{email::LogMailer, AppState};
use reqwest::StatusCode;
use test_utils::*;

#[actix_rt::test]
async fn uptime_counts_from_startup_not_first_health_call() {
    let config = test_config();
    let state = AppState::in_memory(&config, Arc::new(LogMailer)).unwrap();

    tokio::time::sleep(Duration::from_millis(1100)).await;

    let app = TestApp::spawn_state(config, state).await;
    let (status, body) = app.get_json("/api/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_ne!(body["uptime"], "0s");
    assert!(body["startAt"].is_string());
}
