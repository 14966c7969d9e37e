//! Periscope Query - the read side of the toolkit
//!
//! Adapters provide primitive reads; this crate turns them into the three
//! dashboard shapes (instance pages, group summaries, time series) plus the
//! detail/related lookups. All filtering and aggregation lives here so every
//! storage backend answers identically.

pub mod aggregate;
pub mod engine;
pub mod error;
pub mod filter;
pub mod period;

pub use aggregate::{GroupSummary, OutcomeCounts, SeriesBucket};
pub use engine::{EventDetail, Page, QueryEngine};
pub use error::QueryError;
pub use filter::{GroupQuery, InstanceQuery, StatusFilter, DEFAULT_LIMIT};
pub use period::{Period, SERIES_BUCKETS};
