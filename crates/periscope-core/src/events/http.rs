//! HTTP-shaped events - outgoing client calls and inbound requests

use super::ErrorInfo;
use serde::{Deserialize, Serialize};

/// Outgoing HTTP client call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpContent {
    /// Request method
    pub method: String,

    /// Full request URI (the group key strips the query string)
    pub uri: String,

    /// Response status code; absent when the call failed before a response
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,

    /// Wall-clock duration in milliseconds
    #[serde(default)]
    pub duration_ms: f64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
}

/// Inbound request handled by the instrumented application
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestContent {
    /// Request method
    pub method: String,

    /// Matched route path (the group key)
    pub path: String,

    /// Response status code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,

    /// Wall-clock duration in milliseconds
    #[serde(default)]
    pub duration_ms: f64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
}
