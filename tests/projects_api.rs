
use reqwest::{Method, StatusCode};
use serde_json::json;
use test_utils::*;

#[actix_rt::test]
async fn list_returns_published_projects_with_paging() {
    let app = TestApp::spawn().await;

    let (status, body) = app.get_json("/api/projects").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["total"], 6);
    assert_eq!(body["count"], 6);
    assert_eq!(body["page"], 1);
    assert_eq!(body["pages"], 1);
    assert_eq!(body["data"][0]["slug"], "t1dubb");
}

#[actix_rt::test]
async fn featured_filter_returns_only_featured() {
    let app = TestApp::spawn().await;

    let (_, body) = app.get_json("/api/projects?featured=true").await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["data"][0]["slug"], "t1dubb");

    let (_, featured) = app.get_json("/api/projects/featured").await;
    assert_eq!(featured["count"], 1);
}

#[actix_rt::test]
async fn category_filter_and_all_bucket() {
    let app = TestApp::spawn().await;

    let (_, ai) = app.get_json("/api/projects?category=AI").await;
    assert_eq!(ai["total"], 1);
    assert_eq!(ai["data"][0]["slug"], "deepclone");

    let (_, all) = app.get_json("/api/projects?category=All").await;
    assert_eq!(all["total"], 6);

    let (_, categories) = app.get_json("/api/projects/categories").await;
    assert_eq!(categories["data"][0], json!({ "_id": "All", "count": 6 }));
    assert_eq!(categories["data"][1], json!({ "_id": "Full-Stack", "count": 4 }));
}

#[actix_rt::test]
async fn paging_splits_results() {
    let app = TestApp::spawn().await;

    let (_, body) = app.get_json("/api/projects?page=2&limit=4").await;
    assert_eq!(body["count"], 2);
    assert_eq!(body["total"], 6);
    assert_eq!(body["pages"], 2);
    assert_eq!(body["page"], 2);
}

#[actix_rt::test]
async fn slug_and_id_resolve_to_the_same_project() {
    let app = TestApp::spawn().await;

    let (status, by_slug) = app.get_json("/api/projects/creative-os").await;
    assert_eq!(status, StatusCode::OK);

    let id = by_slug["data"]["_id"].as_str().unwrap().to_string();
    let (_, by_id) = app.get_json(&format!("/api/projects/{}", id)).await;

    assert_eq!(by_slug["data"], by_id["data"]);
}

#[actix_rt::test]
async fn unknown_project_is_404() {
    let app = TestApp::spawn().await;

    let (status, body) = app.get_json("/api/projects/does-not-exist").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "success": false, "message": "Project not found" }));
}

#[actix_rt::test]
async fn create_update_delete_round_trip() {
    let app = TestApp::spawn().await;

    let (status, created) = app.send_json(Method::POST, "/api/projects", &valid_project()).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["data"]["slug"], "ledger-lens");
    assert_eq!(created["data"]["status"], "published");
    assert_eq!(created["data"]["duration"], "2 months");

    let id = created["data"]["_id"].as_str().unwrap().to_string();
    let path = format!("/api/projects/{}", id);

    let (status, updated) = app
        .send_json(Method::PUT, &path, &json!({ "featured": true, "liveUrl": null }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["data"]["featured"], true);
    assert_eq!(updated["data"]["title"], "Ledger Lens");

    let (status, deleted) = app.send_json(Method::DELETE, &path, &json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["message"], "Project deleted successfully");

    let (status, _) = app.get_json(&path).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn missing_title_is_reported_by_field() {
    let app = TestApp::spawn().await;

    let mut body = valid_project();
    body.as_object_mut().unwrap().remove("title");

    let (status, response) = app.send_json(Method::POST, "/api/projects", &body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["message"], "Validation failed");
    let errors = response["errors"].as_array().unwrap();
    assert!(errors.iter().any(|e| e["field"] == "title" && e["message"] == "Project title is required"));
}

#[actix_rt::test]
async fn duplicate_slug_names_the_field() {
    let app = TestApp::spawn().await;

    let mut body = valid_project();
    body["slug"] = json!("t1dubb");

    let (status, response) = app.send_json(Method::POST, "/api/projects", &body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["message"], "Duplicate value for field: slug");
}

#[actix_rt::test]
async fn malformed_json_is_a_bad_request() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .post(app.url("/api/projects"))
        .header("content-type", "application/json")
        .body("{ not json")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
}

#[actix_rt::test]
async fn unknown_route_is_404_with_path() {
    let app = TestApp::spawn().await;

    let (status, body) = app.get_json("/api/nothing-here").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Not Found - /api/nothing-here");
}

#[actix_rt::test]
async fn health_reports_in_memory_storage() {
    let app = TestApp::spawn().await;

    let (status, body) = app.get_json("/api/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "in-memory");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}
