//! Database events - queries and model mutations

use super::{CompletionStatus, ErrorInfo};
use serde::{Deserialize, Serialize};

/// One database query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryContent {
    /// The SQL text (also the group key)
    pub sql: String,

    /// Leading verb of the SQL text, uppercased (`SELECT`, `UPDATE`, ...)
    pub sql_type: String,

    /// Connection/pool name, when the application runs several
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection: Option<String>,

    pub status: CompletionStatus,

    /// Wall-clock duration in milliseconds
    #[serde(default)]
    pub duration_ms: f64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
}

/// A model lifecycle mutation observed by the application
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelContent {
    pub action: ModelAction,

    /// Model/entity name (the group key)
    pub model: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelAction {
    Created,
    Updated,
    Deleted,
}

impl ModelAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelAction::Created => "created",
            ModelAction::Updated => "updated",
            ModelAction::Deleted => "deleted",
        }
    }
}
