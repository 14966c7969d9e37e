//! Mail and notification send events

use super::{CompletionStatus, ErrorInfo};
use serde::{Deserialize, Serialize};

/// One mail send
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MailContent {
    /// Message subject
    pub subject: String,

    /// Recipients; the first is the group key
    pub to: Vec<String>,

    pub status: CompletionStatus,

    /// Send duration in milliseconds
    #[serde(default)]
    pub duration_ms: f64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
}

/// One notification send
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationContent {
    /// Delivery channel, e.g. "slack" or "sms" (the group key)
    pub channel: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient: Option<String>,

    pub status: CompletionStatus,

    /// Send duration in milliseconds
    #[serde(default)]
    pub duration_ms: f64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
}
