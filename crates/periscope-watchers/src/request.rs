//! Inbound request watcher - axum middleware that opens a request scope
//!
//! Every handled request runs inside a fresh request scope, so queries,
//! cache lookups, and job dispatches made while handling it correlate back
//! to the `request` event recorded on completion.

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use periscope_core::normalize::{self, RawRequest};
use periscope_core::{context, Kind, Recorder};
use std::time::Instant;
use uuid::Uuid;

/// Records handled requests as `request` events
#[derive(Debug, Clone)]
pub struct RequestWatcher {
    recorder: Recorder,
}

impl RequestWatcher {
    pub fn new(recorder: Recorder) -> Self {
        Self { recorder }
    }
}

/// Middleware body, for `axum::middleware::from_fn`:
///
/// ```ignore
/// let watcher = RequestWatcher::new(recorder);
/// let app = app.layer(middleware::from_fn(move |req, next| {
///     observe(watcher.clone(), req, next)
/// }));
/// ```
pub async fn observe(watcher: RequestWatcher, req: Request, next: Next) -> Response {
    let method = req.method().to_string();
    let path = req.uri().path().to_string();
    let request_id = Uuid::new_v4().to_string();

    context::scope(Kind::Request, request_id, async move {
        let started = Instant::now();
        let response = next.run(req).await;
        watcher.recorder.record_at(
            normalize::request(RawRequest {
                method,
                path,
                status: Some(response.status().as_u16()),
                error: None,
                duration: started.elapsed(),
            }),
            None,
        );
        response
    })
    .await
}
