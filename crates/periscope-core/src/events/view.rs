//! Template render events

use super::{CompletionStatus, ErrorInfo};
use serde::{Deserialize, Serialize};

/// One template render
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewContent {
    /// Template name (the group key)
    pub name: String,

    /// Template file path, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    pub status: CompletionStatus,

    /// Render duration in milliseconds
    #[serde(default)]
    pub duration_ms: f64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
}
