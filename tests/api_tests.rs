use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use sea_orm::ConnectionTrait;
use showreel::api::AppState;
use showreel::config::Config;
use std::sync::Arc;
use tower::ServiceExt;

async fn spawn_app_with_state() -> (Arc<AppState>, Router) {
    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();
    config.general.max_db_connections = 1;
    config.general.min_db_connections = 1;

    let state = showreel::api::create_app_state_from_config(config, None)
        .await
        .expect("Failed to create app state");
    (state.clone(), showreel::api::router(state))
}

async fn spawn_app() -> Router {
    spawn_app_with_state().await.1
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, mime::APPLICATION_JSON.as_ref());
            Body::from(serde_json::to_vec(&json).unwrap())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

fn demo() -> Value {
    json!({
        "title": "Demo",
        "description": "desc",
        "videoUrl": "https://x/y.mp4"
    })
}

async fn create(app: &Router, title: &str) -> Value {
    let (status, body) = send(
        app,
        "POST",
        "/api/videos",
        Some(json!({
            "title": title,
            "description": "desc",
            "videoUrl": "https://x/y.mp4",
            "category": "Editing"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["data"].clone()
}

#[tokio::test]
async fn test_create_defaults_category() {
    let app = spawn_app().await;

    let (status, body) = send(&app, "POST", "/api/videos", Some(demo())).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["title"], "Demo");
    assert_eq!(body["data"]["description"], "desc");
    assert_eq!(body["data"]["videoUrl"], "https://x/y.mp4");
    assert_eq!(body["data"]["category"], "Cinematic");
    assert!(body["data"]["id"].is_string());
    assert!(body["data"]["createdAt"].is_string());
    assert_eq!(body["data"]["createdAt"], body["data"]["updatedAt"]);
}

#[tokio::test]
async fn test_create_trims_title_and_normalizes_category() {
    let app = spawn_app().await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/videos",
        Some(json!({
            "title": "  Night Drive  ",
            "description": "desc",
            "videoUrl": "https://x/y.mp4",
            "category": "animation"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["title"], "Night Drive");
    assert_eq!(body["data"]["category"], "Animation");
}

#[tokio::test]
async fn test_create_rejects_empty_title() {
    let app = spawn_app().await;

    let mut payload = demo();
    payload["title"] = json!("");
    let (status, body) = send(&app, "POST", "/api/videos", Some(payload)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    let errors = body["error"].as_array().unwrap();
    assert!(errors.iter().any(|e| e.as_str().unwrap().contains("title")));

    let (_, list) = send(&app, "GET", "/api/videos", None).await;
    assert_eq!(list["count"], 0);
}

#[tokio::test]
async fn test_create_reports_every_invalid_field() {
    let app = spawn_app().await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/videos",
        Some(json!({
            "title": "x".repeat(101),
            "videoUrl": "not a url",
            "category": "Vlog"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let errors: Vec<&str> = body["error"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(Value::as_str)
        .collect();
    assert!(errors.contains(&"Title cannot be more than 100 characters"));
    assert!(errors.contains(&"Please add a description"));
    assert!(errors.contains(&"Video URL must be an absolute URL"));
    assert!(errors.iter().any(|e| e.contains("Vlog")));
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = spawn_app().await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/videos")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{\"title\": "))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_oversized_body_is_rejected() {
    let app = spawn_app().await;

    let mut payload = demo();
    payload["description"] = json!("x".repeat(20 * 1024));
    let (status, _) = send(&app, "POST", "/api/videos", Some(payload)).await;

    assert!(status.is_client_error());
}

#[tokio::test]
async fn test_get_unknown_video_is_not_found() {
    let app = spawn_app().await;

    let (status, body) = send(&app, "GET", "/api/videos/doesnotexist", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"success": false, "error": "Video not found"}));
}

#[tokio::test]
async fn test_get_returns_created_video() {
    let app = spawn_app().await;
    let created = create(&app, "Reel").await;
    let id = created["id"].as_str().unwrap();

    let (status, body) = send(&app, "GET", &format!("/api/videos/{id}"), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], created);
}

#[tokio::test]
async fn test_list_is_newest_first() {
    let app = spawn_app().await;

    for title in ["first", "second", "third"] {
        create(&app, title).await;
    }

    let (status, body) = send(&app, "GET", "/api/videos", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 3);
    let titles: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["third", "second", "first"]);
}

#[tokio::test]
async fn test_update_merges_partial_fields() {
    let app = spawn_app().await;
    let created = create(&app, "Before").await;
    let id = created["id"].as_str().unwrap();

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/videos/{id}"),
        Some(json!({"title": "After", "description": null})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "After");
    assert_eq!(body["data"]["description"], "desc");
    assert_eq!(body["data"]["category"], "Editing");
    assert_eq!(body["data"]["createdAt"], created["createdAt"]);
    assert!(body["data"]["updatedAt"].as_str() >= created["updatedAt"].as_str());
}

#[tokio::test]
async fn test_update_rejects_invalid_merge() {
    let app = spawn_app().await;
    let created = create(&app, "Keep me").await;
    let id = created["id"].as_str().unwrap();

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/videos/{id}"),
        Some(json!({"title": ""})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = send(&app, "GET", &format!("/api/videos/{id}"), None).await;
    assert_eq!(body["data"]["title"], "Keep me");
}

#[tokio::test]
async fn test_update_unknown_video_is_not_found() {
    let app = spawn_app().await;

    let (status, body) = send(
        &app,
        "PUT",
        "/api/videos/doesnotexist",
        Some(json!({"title": ""})),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Video not found");
}

#[tokio::test]
async fn test_delete_then_get_is_not_found() {
    let app = spawn_app().await;
    let created = create(&app, "Doomed").await;
    let uri = format!("/api/videos/{}", created["id"].as_str().unwrap());

    let (status, body) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true, "data": {}}));

    let (status, _) = send(&app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, list) = send(&app, "GET", "/api/videos", None).await;
    assert_eq!(list["count"], 0);
}

#[tokio::test]
async fn test_storage_failure_hides_details() {
    let (state, app) = spawn_app_with_state().await;
    create(&app, "Lost").await;

    state
        .store()
        .conn
        .execute_unprepared("DROP TABLE videos")
        .await
        .unwrap();

    let (status, body) = send(&app, "GET", "/api/videos", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"success": false, "error": "Server Error"}));

    let (status, body) = send(&app, "POST", "/api/videos", Some(demo())).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"success": false, "error": "Server Error"}));
}

#[tokio::test]
async fn test_whitespace_description_is_accepted() {
    let app = spawn_app().await;

    let mut payload = demo();
    payload["description"] = json!("   ");
    let (status, body) = send(&app, "POST", "/api/videos", Some(payload)).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["description"], "   ");
}

#[tokio::test]
async fn test_health_reports_video_count() {
    let app = spawn_app().await;
    create(&app, "One").await;

    let (status, body) = send(&app, "GET", "/api/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "ok");
    assert_eq!(body["data"]["videos"], 1);
}

#[tokio::test]
async fn test_cors_preflight_allows_configured_origin() {
    let app = spawn_app().await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/api/videos")
                .header(header::ORIGIN, "http://localhost:5173")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "http://localhost:5173"
    );
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_CREDENTIALS],
        "true"
    );
}

#[tokio::test]
async fn test_security_headers_are_set() {
    let app = spawn_app().await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/videos")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.headers()[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
    assert_eq!(response.headers()[header::X_FRAME_OPTIONS], "DENY");
}
