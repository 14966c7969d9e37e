//! Log and exception events

use serde::{Deserialize, Serialize};

/// One captured log record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogContent {
    /// Lowercased level name: "trace" through "error" (the group key)
    pub level: String,

    pub message: String,

    /// Structured fields attached to the record
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub context: serde_json::Map<String, serde_json::Value>,
}

/// One reported exception
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExceptionContent {
    /// Error type name (the group key)
    pub class: String,

    pub message: String,

    /// File the report originated from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,

    /// Messages of the error's source chain, outermost first
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub chain: Vec<String>,
}
