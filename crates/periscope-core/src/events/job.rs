//! Queued-job and scheduled-run events

use super::{CompletionStatus, ErrorInfo};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A queued job - recorded at dispatch (queued) and after a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobContent {
    /// Job name
    pub name: String,

    /// Queue the job was dispatched on (the group key)
    pub queue: String,

    pub status: JobStatus,

    /// Attempt count; 0 for dispatch-side events
    #[serde(default)]
    pub attempts: u32,

    /// Handler duration in milliseconds; 0 for dispatch-side events
    #[serde(default)]
    pub duration_ms: f64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Queued,
    Completed,
    Failed,
}

/// One scheduled-task run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleContent {
    /// Task name (the group key)
    pub name: String,

    /// Cron expression the task runs on
    pub expression: String,

    /// Next due time derived from the expression; absent when it does not parse
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_due: Option<DateTime<Utc>>,

    pub status: CompletionStatus,

    /// Run duration in milliseconds
    #[serde(default)]
    pub duration_ms: f64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
}
