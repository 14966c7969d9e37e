//! API surface tests - routing, serialization, and error mapping

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::Utc;
use periscope_core::events::{truncate_to_millis, Event, EventContent, HttpContent};
use periscope_core::CorrelationIds;
use periscope_query::QueryEngine;
use periscope_store::{MemoryStore, StorageAdapter};
use periscope_web::router;
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

fn http_event(uri: &str, status: u16, correlation: CorrelationIds) -> Event {
    Event {
        uuid: Uuid::new_v4(),
        correlation,
        content: EventContent::Http(HttpContent {
            method: "GET".into(),
            uri: uri.into(),
            status: Some(status),
            duration_ms: 8.0,
            error: None,
        }),
        origin: None,
        created_at: truncate_to_millis(Utc::now()),
    }
}

async fn app_with(events: Vec<Event>) -> axum::Router {
    let store = Arc::new(MemoryStore::new());
    for e in &events {
        store.append(e).await.unwrap();
    }
    router(QueryEngine::new(store))
}

async fn get_json(app: &axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
    send_json(app, "GET", uri).await
}

async fn send_json(app: &axum::Router, method: &str, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}

#[tokio::test]
async fn test_instance_index_returns_page() {
    let app = app_with(vec![
        http_event("https://api.example.com/a", 200, CorrelationIds::none()),
        http_event("https://api.example.com/b", 500, CorrelationIds::none()),
    ])
    .await;

    let (status, body) = get_json(&app, "/data/http").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);
    assert_eq!(body["events"].as_array().unwrap().len(), 2);
    assert_eq!(body["limit"], 50);

    let (status, body) = get_json(&app, "/data/http?status=5xx").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["events"][0]["content"]["status"], 500);
}

#[tokio::test]
async fn test_group_index_returns_summaries() {
    let app = app_with(vec![
        http_event("https://api.example.com/a?x=1", 200, CorrelationIds::none()),
        http_event("https://api.example.com/a?x=2", 200, CorrelationIds::none()),
    ])
    .await;

    let (status, body) = get_json(&app, "/data/http?index=group").await;
    assert_eq!(status, StatusCode::OK);
    let groups = body["groups"].as_array().unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0]["key"], "https://api.example.com/a");
    assert_eq!(groups[0]["count"], 2);
    assert_eq!(groups[0]["outcomes"]["2xx"], 2);
}

#[tokio::test]
async fn test_series_has_24_buckets() {
    let app = app_with(vec![http_event(
        "https://api.example.com/a",
        200,
        CorrelationIds::none(),
    )])
    .await;

    let (status, body) = get_json(&app, "/data/http/series?period=1h").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["period"], "1h");
    assert_eq!(body["buckets"].as_array().unwrap().len(), 24);
}

#[tokio::test]
async fn test_detail_and_related_resolve_the_trace() {
    let scope = CorrelationIds::request("req-1");
    let a = http_event("https://api.example.com/a", 200, scope.clone());
    let b = http_event("https://api.example.com/b", 200, scope.clone());
    let a_uuid = a.uuid;
    let b_uuid = b.uuid;
    let app = app_with(vec![a, b]).await;

    let (status, body) = get_json(&app, &format!("/data/http/{a_uuid}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["event"]["uuid"], a_uuid.to_string());
    assert_eq!(body["related"][0]["uuid"], b_uuid.to_string());

    let (status, body) =
        send_json(&app, "POST", &format!("/data/http/{a_uuid}/related")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    // an explicit id-triple body resolves without the anchor fetch, so the
    // anchor itself is part of the set
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/data/http/{a_uuid}/related"))
                .header("content-type", "application/json")
                .body(Body::from(r#"{"request_id":"req-1"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_error_mapping() {
    let app = app_with(Vec::new()).await;

    // unknown entry type -> 400
    let (status, body) = get_json(&app, "/data/widgets").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("widgets"));

    // bad period token -> 400
    let (status, _) = get_json(&app, "/data/http?period=2h").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // missing event -> 404
    let missing = Uuid::new_v4();
    let (status, body) = get_json(&app, &format!("/data/http/{missing}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains(&missing.to_string()));
}

#[tokio::test]
async fn test_detail_of_mismatched_type_is_not_found() {
    let event = http_event("https://api.example.com/a", 200, CorrelationIds::none());
    let uuid = event.uuid;
    let app = app_with(vec![event]).await;

    let (status, _) = get_json(&app, &format!("/data/query/{uuid}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health() {
    let app = app_with(Vec::new()).await;
    let (status, body) = get_json(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(body["version"].is_string());
}
