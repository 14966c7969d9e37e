//! Periscope Core - event model, normalizer, correlation carrier, capture channel
//!
//! This crate provides the foundational types for the Periscope toolkit:
//!
//! - **Events**: the canonical tagged telemetry schema
//! - **Normalize**: total mapping from raw library captures to canonical content
//! - **Context**: the task-scoped correlation id carrier
//! - **Capture**: the non-blocking recorder + channel feeding storage
//! - **Config**: TOML configuration with full defaults

pub mod capture;
pub mod config;
pub mod context;
pub mod events;
pub mod normalize;

// Re-export commonly used types
pub use capture::{channel, CaptureError, Recorder};
pub use config::{PeriscopeConfig, StorageDriver, StorageSettings, WebSettings};
pub use context::{CorrelationIds, Kind};
pub use events::{
    CallSite, CompletionStatus, EntryType, ErrorInfo, Event, EventContent, Outcome, StatusClass,
};

/// Crate version, reported by the query API health endpoint
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
