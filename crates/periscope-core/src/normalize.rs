//! Event normalizer - maps library-specific raw captures into canonical content
//!
//! Every function here is total: unmappable or missing fields resolve to
//! documented defaults (duration 0, status completed when no error signal is
//! present) instead of failing the capture.

use crate::events::{
    CacheContent, CacheOperation, CompletionStatus, ErrorInfo, EventContent, ExceptionContent,
    HttpContent, JobContent, JobStatus, LogContent, MailContent, ModelAction, ModelContent,
    NotificationContent, QueryContent, RequestContent, ScheduleContent, ViewContent,
};
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Raw capture of an outgoing HTTP call
#[derive(Debug, Clone)]
pub struct RawHttp {
    pub method: String,
    pub uri: String,
    pub status: Option<u16>,
    pub error: Option<ErrorInfo>,
    pub duration: Duration,
}

/// Raw capture of an inbound request
#[derive(Debug, Clone)]
pub struct RawRequest {
    pub method: String,
    pub path: String,
    pub status: Option<u16>,
    pub error: Option<ErrorInfo>,
    pub duration: Duration,
}

/// Raw capture of a database query
#[derive(Debug, Clone)]
pub struct RawQuery {
    pub sql: String,
    pub connection: Option<String>,
    pub error: Option<ErrorInfo>,
    pub duration: Duration,
}

/// Raw capture of a completed job run
#[derive(Debug, Clone)]
pub struct RawJob {
    pub name: String,
    pub queue: String,
    pub attempts: u32,
    pub error: Option<ErrorInfo>,
    pub duration: Duration,
}

/// Raw capture of a scheduled-task run
#[derive(Debug, Clone)]
pub struct RawSchedule {
    pub name: String,
    pub expression: String,
    pub next_due: Option<DateTime<Utc>>,
    pub error: Option<ErrorInfo>,
    pub duration: Duration,
}

/// Raw capture of a cache operation
#[derive(Debug, Clone)]
pub struct RawCache {
    pub operation: CacheOperation,
    pub key: String,
    pub duration: Duration,
}

/// Raw capture of a mail send
#[derive(Debug, Clone)]
pub struct RawMail {
    pub subject: String,
    pub to: Vec<String>,
    pub error: Option<ErrorInfo>,
    pub duration: Duration,
}

/// Raw capture of a notification send
#[derive(Debug, Clone)]
pub struct RawNotification {
    pub channel: String,
    pub recipient: Option<String>,
    pub error: Option<ErrorInfo>,
    pub duration: Duration,
}

/// Raw capture of a log record
#[derive(Debug, Clone)]
pub struct RawLog {
    pub level: String,
    pub message: String,
    pub context: serde_json::Map<String, serde_json::Value>,
}

/// Raw capture of a template render
#[derive(Debug, Clone)]
pub struct RawView {
    pub name: String,
    pub path: Option<String>,
    pub error: Option<ErrorInfo>,
    pub duration: Duration,
}

/// Raw capture of a reported exception
#[derive(Debug, Clone)]
pub struct RawException {
    pub class: String,
    pub message: String,
    pub file: Option<String>,
    pub line: Option<u32>,
    pub chain: Vec<String>,
}

pub fn http(raw: RawHttp) -> EventContent {
    EventContent::Http(HttpContent {
        method: raw.method,
        uri: raw.uri,
        status: raw.status,
        duration_ms: millis(raw.duration),
        error: raw.error,
    })
}

pub fn request(raw: RawRequest) -> EventContent {
    EventContent::Request(RequestContent {
        method: raw.method,
        path: raw.path,
        status: raw.status,
        duration_ms: millis(raw.duration),
        error: raw.error,
    })
}

pub fn query(raw: RawQuery) -> EventContent {
    let status = status_from_error(&raw.error);
    EventContent::Query(QueryContent {
        sql_type: sql_type(&raw.sql),
        sql: raw.sql,
        connection: raw.connection,
        status,
        duration_ms: millis(raw.duration),
        error: raw.error,
    })
}

pub fn job(raw: RawJob) -> EventContent {
    let status = match raw.error {
        Some(_) => JobStatus::Failed,
        None => JobStatus::Completed,
    };
    EventContent::Job(JobContent {
        name: raw.name,
        queue: raw.queue,
        status,
        attempts: raw.attempts,
        duration_ms: millis(raw.duration),
        error: raw.error,
    })
}

/// Dispatch-side job event: queued, no attempts, no duration
pub fn job_dispatched(name: &str, queue: &str) -> EventContent {
    EventContent::Job(JobContent {
        name: name.to_string(),
        queue: queue.to_string(),
        status: JobStatus::Queued,
        attempts: 0,
        duration_ms: 0.0,
        error: None,
    })
}

pub fn schedule(raw: RawSchedule) -> EventContent {
    let status = status_from_error(&raw.error);
    EventContent::Schedule(ScheduleContent {
        name: raw.name,
        expression: raw.expression,
        next_due: raw.next_due,
        status,
        duration_ms: millis(raw.duration),
        error: raw.error,
    })
}

pub fn cache(raw: RawCache) -> EventContent {
    EventContent::Cache(CacheContent {
        operation: raw.operation,
        key: raw.key,
        duration_ms: millis(raw.duration),
    })
}

pub fn mail(raw: RawMail) -> EventContent {
    let status = status_from_error(&raw.error);
    EventContent::Mail(MailContent {
        subject: raw.subject,
        to: raw.to,
        status,
        duration_ms: millis(raw.duration),
        error: raw.error,
    })
}

pub fn notification(raw: RawNotification) -> EventContent {
    let status = status_from_error(&raw.error);
    EventContent::Notification(NotificationContent {
        channel: raw.channel,
        recipient: raw.recipient,
        status,
        duration_ms: millis(raw.duration),
        error: raw.error,
    })
}

pub fn log(raw: RawLog) -> EventContent {
    EventContent::Log(LogContent {
        level: raw.level.to_lowercase(),
        message: raw.message,
        context: raw.context,
    })
}

pub fn view(raw: RawView) -> EventContent {
    let status = status_from_error(&raw.error);
    EventContent::View(ViewContent {
        name: raw.name,
        path: raw.path,
        status,
        duration_ms: millis(raw.duration),
        error: raw.error,
    })
}

pub fn model(action: ModelAction, model_name: &str) -> EventContent {
    EventContent::Model(ModelContent {
        action,
        model: model_name.to_string(),
    })
}

pub fn exception(raw: RawException) -> EventContent {
    EventContent::Exception(ExceptionContent {
        class: raw.class,
        message: raw.message,
        file: raw.file,
        line: raw.line,
        chain: raw.chain,
    })
}

/// Duration uniformly in milliseconds
pub fn millis(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}

/// "completed" when no error signal is present, "failed" otherwise
pub fn status_from_error(error: &Option<ErrorInfo>) -> CompletionStatus {
    match error {
        Some(_) => CompletionStatus::Failed,
        None => CompletionStatus::Completed,
    }
}

/// Leading verb of the SQL text, uppercased; `UNKNOWN` for empty text
pub fn sql_type(sql: &str) -> String {
    sql.split_whitespace()
        .next()
        .map(|verb| verb.to_uppercase())
        .unwrap_or_else(|| "UNKNOWN".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Outcome;

    #[test]
    fn test_sql_type_leading_verb() {
        assert_eq!(sql_type("select * from users"), "SELECT");
        assert_eq!(sql_type("  UPDATE users SET name=?"), "UPDATE");
        assert_eq!(sql_type("insert\ninto t values (1)"), "INSERT");
        assert_eq!(sql_type(""), "UNKNOWN");
        assert_eq!(sql_type("   "), "UNKNOWN");
    }

    #[test]
    fn test_millis() {
        assert_eq!(millis(Duration::from_millis(250)), 250.0);
        assert_eq!(millis(Duration::ZERO), 0.0);
    }

    #[test]
    fn test_failed_update_query() {
        let content = query(RawQuery {
            sql: "UPDATE users SET name=?".into(),
            connection: None,
            error: Some(ErrorInfo::new("sqlx::Error", "constraint violation")),
            duration: Duration::from_millis(3),
        });
        let EventContent::Query(q) = &content else {
            panic!("expected query content");
        };
        assert_eq!(q.sql_type, "UPDATE");
        assert_eq!(q.status, CompletionStatus::Failed);
        assert!(q.error.is_some());
        assert_eq!(content.outcome(), Outcome::Failed);
    }

    #[test]
    fn test_no_error_signal_defaults_to_completed() {
        let content = view(RawView {
            name: "welcome".into(),
            path: None,
            error: None,
            duration: Duration::ZERO,
        });
        assert_eq!(content.outcome(), Outcome::Completed);
        assert_eq!(content.duration_ms(), 0.0);
    }

    #[test]
    fn test_job_dispatched_defaults() {
        let content = job_dispatched("SendWelcomeEmail", "emails");
        let EventContent::Job(j) = &content else {
            panic!("expected job content");
        };
        assert_eq!(j.status, JobStatus::Queued);
        assert_eq!(j.attempts, 0);
        assert_eq!(j.duration_ms, 0.0);
    }

    #[test]
    fn test_log_level_lowercased() {
        let content = log(RawLog {
            level: "ERROR".into(),
            message: "boom".into(),
            context: serde_json::Map::new(),
        });
        let EventContent::Log(l) = &content else {
            panic!("expected log content");
        };
        assert_eq!(l.level, "error");
        assert_eq!(content.outcome(), Outcome::Failed);
    }
}
