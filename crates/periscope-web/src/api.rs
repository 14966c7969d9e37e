//! REST API handlers

use crate::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use periscope_core::events::EntryType;
use periscope_query::{
    EventDetail, GroupQuery, GroupSummary, InstanceQuery, Page, Period, QueryError, SeriesBucket,
    StatusFilter, DEFAULT_LIMIT,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;
use uuid::Uuid;

/// Query string of the index endpoint
#[derive(Debug, Default, Deserialize)]
pub struct IndexParams {
    /// Window token: 1h, 24h, 7d, 14d, 30d
    pub period: Option<String>,
    /// Outcome filter: all, 1xx..5xx, completed, failed
    pub status: Option<String>,
    /// Free-text search (instance mode only)
    pub q: Option<String>,
    /// `instance` (default) or `group`
    pub index: Option<String>,
    pub offset: Option<usize>,
    pub limit: Option<usize>,
}

/// Index endpoint payload, shaped by the requested mode
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum IndexResponse {
    Instances(Page),
    Groups { groups: Vec<GroupSummary> },
}

#[derive(Debug, Serialize)]
pub struct SeriesResponse {
    pub period: String,
    pub buckets: Vec<SeriesBucket>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Errors rendered as JSON with the mapped status code
pub struct ApiError(QueryError);

impl From<QueryError> for ApiError {
    fn from(e: QueryError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            QueryError::InvalidFilter(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            QueryError::NotFound(uuid) => {
                (StatusCode::NOT_FOUND, format!("no event with uuid {uuid}"))
            }
            QueryError::Storage(e) => {
                error!(target: "periscope_web", error = %e, "storage failure");
                (StatusCode::INTERNAL_SERVER_ERROR, "storage failure".into())
            }
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

fn parse_entry_type(raw: &str) -> Result<EntryType, ApiError> {
    EntryType::parse(raw)
        .ok_or_else(|| QueryError::InvalidFilter(format!("unknown entry type {raw:?}")).into())
}

fn parse_period(raw: &Option<String>) -> Result<Period, QueryError> {
    match raw {
        Some(token) => Period::parse(token),
        None => Ok(Period::default()),
    }
}

pub async fn index(
    State(state): State<Arc<AppState>>,
    Path(entry_type): Path<String>,
    Query(params): Query<IndexParams>,
) -> Result<Json<IndexResponse>, ApiError> {
    let entry_type = parse_entry_type(&entry_type)?;
    let period = parse_period(&params.period)?;

    if params.index.as_deref() == Some("group") {
        let groups = state
            .engine
            .groups(entry_type, &GroupQuery { period })
            .await?;
        return Ok(Json(IndexResponse::Groups { groups }));
    }

    let status = match &params.status {
        Some(token) => StatusFilter::parse(token)?,
        None => StatusFilter::All,
    };
    let page = state
        .engine
        .instances(
            entry_type,
            &InstanceQuery {
                period,
                status,
                search: params.q.clone(),
                offset: params.offset.unwrap_or(0),
                limit: params.limit.unwrap_or(DEFAULT_LIMIT),
            },
        )
        .await?;
    Ok(Json(IndexResponse::Instances(page)))
}

pub async fn series(
    State(state): State<Arc<AppState>>,
    Path(entry_type): Path<String>,
    Query(params): Query<IndexParams>,
) -> Result<Json<SeriesResponse>, ApiError> {
    let entry_type = parse_entry_type(&entry_type)?;
    let period = parse_period(&params.period)?;
    let buckets = state
        .engine
        .series(entry_type, &GroupQuery { period })
        .await?;
    Ok(Json(SeriesResponse {
        period: period.as_str().to_string(),
        buckets,
    }))
}

pub async fn detail(
    State(state): State<Arc<AppState>>,
    Path((entry_type, id)): Path<(String, Uuid)>,
) -> Result<Json<EventDetail>, ApiError> {
    let entry_type = parse_entry_type(&entry_type)?;
    let detail = state.engine.detail(id).await?;
    if detail.event.entry_type() != entry_type {
        return Err(QueryError::NotFound(id).into());
    }
    Ok(Json(detail))
}

/// With a JSON id-triple body the relation set is resolved directly, without
/// fetching the anchor event first.
pub async fn related(
    State(state): State<Arc<AppState>>,
    Path((entry_type, id)): Path<(String, Uuid)>,
    body: Option<Json<periscope_core::CorrelationIds>>,
) -> Result<Json<Vec<periscope_core::Event>>, ApiError> {
    parse_entry_type(&entry_type)?;
    match body {
        Some(Json(ids)) => Ok(Json(state.engine.related_by(&ids).await?)),
        None => Ok(Json(state.engine.related(id).await?)),
    }
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: periscope_core::VERSION,
    })
}
