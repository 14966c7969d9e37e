//! Full pipeline test: instrumented app -> capture channel -> writer ->
//! store -> dashboard API

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::routing::get;
use axum::Router;
use periscope_core::channel;
use periscope_query::QueryEngine;
use periscope_store::{writer::spawn_writer, MemoryStore};
use periscope_watchers::db::QueryWatcher;
use periscope_watchers::request::{observe, RequestWatcher};
use periscope_web::router;
use std::sync::Arc;
use tower::ServiceExt;

#[tokio::test]
async fn test_request_trace_reaches_the_dashboard() {
    let (recorder, rx) = channel(64);
    let store = Arc::new(MemoryStore::new());
    let writer = spawn_writer(store.clone(), rx);

    // an instrumented application: request middleware plus a watched query
    let request_watcher = RequestWatcher::new(recorder.clone());
    let query_watcher = QueryWatcher::new(recorder.clone());
    let app = Router::new()
        .route(
            "/users",
            get(move || {
                let query_watcher = query_watcher.clone();
                async move {
                    query_watcher
                        .observe("SELECT * FROM users", None, async {
                            Ok::<_, std::io::Error>(())
                        })
                        .await
                        .unwrap();
                    "ok"
                }
            }),
        )
        .layer(axum::middleware::from_fn(move |req, next| {
            observe(request_watcher.clone(), req, next)
        }));

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/users")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // close every recorder handle so the writer drains and exits
    drop(app);
    drop(recorder);
    assert_eq!(writer.await.unwrap(), 2);

    // the trace is now visible through the dashboard API
    let dashboard = router(QueryEngine::new(store));
    let response = dashboard
        .clone()
        .oneshot(
            Request::builder()
                .uri("/data/request")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["total"], 1);
    let uuid = body["events"][0]["uuid"].as_str().unwrap().to_string();
    assert_eq!(body["events"][0]["content"]["path"], "/users");

    let response = dashboard
        .oneshot(
            Request::builder()
                .uri(format!("/data/request/{uuid}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["related"].as_array().unwrap().len(), 1);
    assert_eq!(body["related"][0]["content"]["type"], "query");
}
