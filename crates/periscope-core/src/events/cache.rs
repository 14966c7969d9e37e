//! Cache operation events

use serde::{Deserialize, Serialize};

/// One cache operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheContent {
    pub operation: CacheOperation,

    /// Cache key (the group key)
    pub key: String,

    /// Wall-clock duration in milliseconds
    #[serde(default)]
    pub duration_ms: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheOperation {
    Hit,
    Missed,
    Set,
    Forget,
}

impl CacheOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheOperation::Hit => "hit",
            CacheOperation::Missed => "missed",
            CacheOperation::Set => "set",
            CacheOperation::Forget => "forget",
        }
    }
}
