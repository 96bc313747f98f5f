
use reqwest::{Method, StatusCode};
use serde_json::json;
use test_utils::*;

#[actix_rt::test]
async fn list_orders_featured_then_newest() {
    let app = TestApp::spawn().await;

    let (status, body) = app.get_json("/api/events").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 4);
    let titles: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles[0], "1Billion Summit – AI Film Award");
    assert_eq!(titles[3], "Egypt AI Innovation Forum");
}

#[actix_rt::test]
async fn type_filter_and_all_bucket() {
    let app = TestApp::spawn().await;

    let (_, conferences) = app.get_json("/api/events?type=conference").await;
    assert_eq!(conferences["total"], 2);

    let (_, all) = app.get_json("/api/events?type=all").await;
    assert_eq!(all["total"], 4);

    let (_, types) = app.get_json("/api/events/types").await;
    assert_eq!(types["data"][0], json!({ "_id": "all", "count": 4 }));
    assert_eq!(types["data"][1], json!({ "_id": "conference", "count": 2 }));
}

#[actix_rt::test]
async fn featured_events_follow_display_order() {
    let app = TestApp::spawn().await;

    let (_, body) = app.get_json("/api/events/featured").await;

    assert_eq!(body["count"], 3);
    assert_eq!(body["data"][0]["title"], "Cairo AI Hackathon 2024");
    assert_eq!(body["data"][0]["formattedDate"], "Mar 2024");
}

#[actix_rt::test]
async fn malformed_event_id_is_404() {
    let app = TestApp::spawn().await;

    let (status, body) = app.get_json("/api/events/not-a-uuid").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Event not found");
}

#[actix_rt::test]
async fn create_update_delete_round_trip() {
    let app = TestApp::spawn().await;

    let (status, created) = app.send_json(Method::POST, "/api/events", &valid_event()).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["data"]["type"], "meetup");
    assert_eq!(created["data"]["status"], "completed");

    let id = created["data"]["_id"].as_str().unwrap().to_string();
    let path = format!("/api/events/{}", id);

    let (status, fetched) = app.get_json(&path).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["data"]["formattedDate"], "Jun 2024");

    let (status, updated) = app
        .send_json(Method::PUT, &path, &json!({ "featured": true, "teamSize": 3 }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["data"]["featured"], true);
    assert_eq!(updated["data"]["teamSize"], 3);

    let (status, deleted) = app.send_json(Method::DELETE, &path, &json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["message"], "Event deleted successfully");
}

#[actix_rt::test]
async fn invalid_event_type_is_rejected() {
    let app = TestApp::spawn().await;

    let mut body = valid_event();
    body["type"] = json!("party");

    let (status, response) = app.send_json(Method::POST, "/api/events", &body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["message"], "Validation failed");
}
