//! Periscope Web - the dashboard HTTP API
//!
//! A thin axum surface over the query engine:
//!
//! - `GET  /data/{type}` - instance pages, or group summaries with `?index=group`
//! - `GET  /data/{type}/series` - 24-bucket time series
//! - `GET  /data/{type}/{id}` - one event with its trace
//! - `POST /data/{type}/{id}/related` - the trace alone
//! - `GET  /health` - liveness and version

pub mod api;

use axum::routing::{get, post};
use axum::Router;
use periscope_core::WebSettings;
use periscope_query::QueryEngine;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

/// Shared handler state
pub struct AppState {
    pub engine: QueryEngine,
}

/// Build the API router
pub fn router(engine: QueryEngine) -> Router {
    let state = Arc::new(AppState { engine });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/data/{type}", get(api::index))
        .route("/data/{type}/series", get(api::series))
        .route("/data/{type}/{id}", get(api::detail))
        .route("/data/{type}/{id}/related", post(api::related))
        .route("/health", get(api::health))
        .layer(cors)
        .with_state(state)
}

/// Bind and serve the API until the process exits
pub async fn serve(settings: &WebSettings, engine: QueryEngine) -> anyhow::Result<()> {
    let app = router(engine);
    let addr = format!("{}:{}", settings.host, settings.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(target: "periscope_web", %addr, "dashboard API listening");
    axum::serve(listener, app).await?;
    Ok(())
}
