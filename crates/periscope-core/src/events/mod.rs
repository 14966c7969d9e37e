//! Periscope event types - the canonical telemetry schema
//!
//! Every captured dependency call normalizes into an [`Event`] carrying one
//! of twelve strongly-typed content payloads. The discriminant lives in the
//! content itself, so a tag/content mismatch is unrepresentable in memory.

pub mod cache;
pub mod http;
pub mod job;
pub mod log;
pub mod mail;
pub mod query;
pub mod view;

pub use cache::*;
pub use http::*;
pub use job::*;
pub use log::*;
pub use mail::*;
pub use query::*;
pub use view::*;

use crate::context::{self, CorrelationIds};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One captured, normalized record of an external-dependency call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Globally unique identifier, assigned at capture time
    pub uuid: Uuid,

    /// Correlation ids - at most one populated, all absent when captured
    /// outside any traced unit of work
    #[serde(flatten)]
    pub correlation: CorrelationIds,

    /// Type-specific payload; its tag is always the event's type
    pub content: EventContent,

    /// File/line hint for where the observed call originated
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<CallSite>,

    /// Capture timestamp, millisecond precision
    pub created_at: DateTime<Utc>,
}

impl Event {
    /// Capture an event now, tagged with the active correlation scope.
    ///
    /// The timestamp is truncated to millisecond precision so that every
    /// storage backend round-trips it identically.
    pub fn capture(content: EventContent, origin: Option<CallSite>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            correlation: context::current(),
            content,
            origin,
            created_at: truncate_to_millis(Utc::now()),
        }
    }

    /// The outer type tag, always derived from the content variant
    pub fn entry_type(&self) -> EntryType {
        self.content.entry_type()
    }
}

/// Truncate a timestamp to millisecond precision
pub fn truncate_to_millis(ts: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(ts.timestamp_millis()).unwrap_or(ts)
}

/// Source-location hint for a captured call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallSite {
    pub file: String,
    pub line: u32,
}

impl CallSite {
    /// Capture the caller's location. Pair with `#[track_caller]` on the
    /// public entry point so the hint points at application code.
    #[track_caller]
    pub fn caller() -> Self {
        let location = std::panic::Location::caller();
        Self {
            file: location.file().to_string(),
            line: location.line(),
        }
    }
}

/// Uniform error payload carried by failed events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Error class hint (type name or family label)
    pub name: String,
    /// Human-readable message
    pub message: String,
}

impl ErrorInfo {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
        }
    }
}

/// The closed set of event types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryType {
    Http,
    Query,
    Job,
    Schedule,
    Cache,
    Mail,
    Notification,
    Log,
    Model,
    View,
    Exception,
    Request,
}

impl EntryType {
    /// All event types, for iteration in tests and bootstrap
    pub const ALL: [EntryType; 12] = [
        EntryType::Http,
        EntryType::Query,
        EntryType::Job,
        EntryType::Schedule,
        EntryType::Cache,
        EntryType::Mail,
        EntryType::Notification,
        EntryType::Log,
        EntryType::Model,
        EntryType::View,
        EntryType::Exception,
        EntryType::Request,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntryType::Http => "http",
            EntryType::Query => "query",
            EntryType::Job => "job",
            EntryType::Schedule => "schedule",
            EntryType::Cache => "cache",
            EntryType::Mail => "mail",
            EntryType::Notification => "notification",
            EntryType::Log => "log",
            EntryType::Model => "model",
            EntryType::View => "view",
            EntryType::Exception => "exception",
            EntryType::Request => "request",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "http" => Some(EntryType::Http),
            "query" => Some(EntryType::Query),
            "job" => Some(EntryType::Job),
            "schedule" => Some(EntryType::Schedule),
            "cache" => Some(EntryType::Cache),
            "mail" => Some(EntryType::Mail),
            "notification" => Some(EntryType::Notification),
            "log" => Some(EntryType::Log),
            "model" => Some(EntryType::Model),
            "view" => Some(EntryType::View),
            "exception" => Some(EntryType::Exception),
            "request" => Some(EntryType::Request),
            _ => None,
        }
    }
}

impl std::fmt::Display for EntryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// HTTP status class, by first digit of the 3-digit status code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusClass {
    #[serde(rename = "1xx")]
    Informational,
    #[serde(rename = "2xx")]
    Success,
    #[serde(rename = "3xx")]
    Redirect,
    #[serde(rename = "4xx")]
    ClientError,
    #[serde(rename = "5xx")]
    ServerError,
}

impl StatusClass {
    pub fn of(code: u16) -> Self {
        match code / 100 {
            2 => StatusClass::Success,
            3 => StatusClass::Redirect,
            4 => StatusClass::ClientError,
            5 => StatusClass::ServerError,
            _ => StatusClass::Informational,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StatusClass::Informational => "1xx",
            StatusClass::Success => "2xx",
            StatusClass::Redirect => "3xx",
            StatusClass::ClientError => "4xx",
            StatusClass::ServerError => "5xx",
        }
    }
}

/// Completion signal for non-HTTP-shaped events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionStatus {
    Completed,
    Failed,
}

/// The status dimension an event contributes to aggregates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// HTTP-shaped events bucket by status class
    Status(StatusClass),
    Completed,
    Failed,
}

/// Type-specific event payloads, tagged by event type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventContent {
    Http(HttpContent),
    Query(QueryContent),
    Job(JobContent),
    Schedule(ScheduleContent),
    Cache(CacheContent),
    Mail(MailContent),
    Notification(NotificationContent),
    Log(LogContent),
    Model(ModelContent),
    View(ViewContent),
    Exception(ExceptionContent),
    Request(RequestContent),
}

impl EventContent {
    /// The type tag this content carries
    pub fn entry_type(&self) -> EntryType {
        match self {
            EventContent::Http(_) => EntryType::Http,
            EventContent::Query(_) => EntryType::Query,
            EventContent::Job(_) => EntryType::Job,
            EventContent::Schedule(_) => EntryType::Schedule,
            EventContent::Cache(_) => EntryType::Cache,
            EventContent::Mail(_) => EntryType::Mail,
            EventContent::Notification(_) => EntryType::Notification,
            EventContent::Log(_) => EntryType::Log,
            EventContent::Model(_) => EntryType::Model,
            EventContent::View(_) => EntryType::View,
            EventContent::Exception(_) => EntryType::Exception,
            EventContent::Request(_) => EntryType::Request,
        }
    }

    /// Duration in milliseconds; 0 for events with no meaningful duration
    pub fn duration_ms(&self) -> f64 {
        match self {
            EventContent::Http(c) => c.duration_ms,
            EventContent::Query(c) => c.duration_ms,
            EventContent::Job(c) => c.duration_ms,
            EventContent::Schedule(c) => c.duration_ms,
            EventContent::Cache(c) => c.duration_ms,
            EventContent::Mail(c) => c.duration_ms,
            EventContent::Notification(c) => c.duration_ms,
            EventContent::View(c) => c.duration_ms,
            EventContent::Request(c) => c.duration_ms,
            EventContent::Log(_) | EventContent::Model(_) | EventContent::Exception(_) => 0.0,
        }
    }

    /// The status dimension this event contributes to aggregates
    pub fn outcome(&self) -> Outcome {
        match self {
            EventContent::Http(c) => http_outcome(c.status, c.error.is_some()),
            EventContent::Request(c) => http_outcome(c.status, c.error.is_some()),
            EventContent::Query(c) => completion(c.status),
            EventContent::Job(c) => match c.status {
                JobStatus::Failed => Outcome::Failed,
                JobStatus::Queued | JobStatus::Completed => Outcome::Completed,
            },
            EventContent::Schedule(c) => completion(c.status),
            EventContent::Mail(c) => completion(c.status),
            EventContent::Notification(c) => completion(c.status),
            EventContent::View(c) => completion(c.status),
            EventContent::Cache(_) | EventContent::Model(_) => Outcome::Completed,
            EventContent::Log(c) => {
                if c.level == "error" {
                    Outcome::Failed
                } else {
                    Outcome::Completed
                }
            }
            EventContent::Exception(_) => Outcome::Failed,
        }
    }

    /// The type-specific key group-mode aggregates fold on
    pub fn group_key(&self) -> String {
        match self {
            EventContent::Http(c) => strip_query_string(&c.uri).to_string(),
            EventContent::Request(c) => c.path.clone(),
            EventContent::Query(c) => c.sql.clone(),
            EventContent::Job(c) => c.queue.clone(),
            EventContent::Schedule(c) => c.name.clone(),
            EventContent::Cache(c) => c.key.clone(),
            EventContent::Mail(c) => c
                .to
                .first()
                .cloned()
                .unwrap_or_else(|| "unknown".to_string()),
            EventContent::Notification(c) => c.channel.clone(),
            EventContent::Log(c) => c.level.clone(),
            EventContent::Model(c) => c.model.clone(),
            EventContent::View(c) => c.name.clone(),
            EventContent::Exception(c) => c.class.clone(),
        }
    }

    /// Concatenated text the instance-mode free-text filter searches over
    pub fn search_text(&self) -> String {
        match self {
            EventContent::Http(c) => format!("{} {}", c.method, c.uri),
            EventContent::Request(c) => format!("{} {}", c.method, c.path),
            EventContent::Query(c) => c.sql.clone(),
            EventContent::Job(c) => format!("{} {}", c.name, c.queue),
            EventContent::Schedule(c) => format!("{} {}", c.name, c.expression),
            EventContent::Cache(c) => c.key.clone(),
            EventContent::Mail(c) => format!("{} {}", c.subject, c.to.join(" ")),
            EventContent::Notification(c) => match &c.recipient {
                Some(recipient) => format!("{} {}", c.channel, recipient),
                None => c.channel.clone(),
            },
            EventContent::Log(c) => format!("{} {}", c.level, c.message),
            EventContent::Model(c) => c.model.clone(),
            EventContent::View(c) => match &c.path {
                Some(path) => format!("{} {}", c.name, path),
                None => c.name.clone(),
            },
            EventContent::Exception(c) => format!("{} {}", c.class, c.message),
        }
    }

    /// The uniform error payload, if the event failed
    pub fn error(&self) -> Option<&ErrorInfo> {
        match self {
            EventContent::Http(c) => c.error.as_ref(),
            EventContent::Request(c) => c.error.as_ref(),
            EventContent::Query(c) => c.error.as_ref(),
            EventContent::Job(c) => c.error.as_ref(),
            EventContent::Schedule(c) => c.error.as_ref(),
            EventContent::Mail(c) => c.error.as_ref(),
            EventContent::Notification(c) => c.error.as_ref(),
            EventContent::View(c) => c.error.as_ref(),
            _ => None,
        }
    }
}

fn http_outcome(status: Option<u16>, has_error: bool) -> Outcome {
    match status {
        Some(code) => Outcome::Status(StatusClass::of(code)),
        None if has_error => Outcome::Failed,
        None => Outcome::Completed,
    }
}

fn completion(status: CompletionStatus) -> Outcome {
    match status {
        CompletionStatus::Completed => Outcome::Completed,
        CompletionStatus::Failed => Outcome::Failed,
    }
}

fn strip_query_string(uri: &str) -> &str {
    uri.split('?').next().unwrap_or(uri)
}
