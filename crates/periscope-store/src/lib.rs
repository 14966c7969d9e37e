//! Storage adapters for Periscope events
//!
//! One logical schema - `uuid`, the correlation id triple, `type`, `content`,
//! `created_at` - realized across an in-memory store and relational engines
//! with a JSON content column. Adapters expose storage primitives only; all
//! filter and aggregation semantics live in `periscope-query`, so every
//! backend produces identical logical results by construction. The shared
//! contract suite in `tests/contract.rs` pins the primitives.

pub mod memory;
pub mod postgres;
pub mod sqlite;
pub mod writer;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;
pub use sqlite::SqliteStore;
pub use writer::spawn_writer;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use periscope_core::events::{CallSite, EntryType, Event, EventContent};
use periscope_core::{CorrelationIds, StorageDriver, StorageSettings};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Storage errors. Write-side failures are best-effort (logged and dropped
/// by the writer task); read-side failures surface through the query API.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("could not open storage backend: {0}")]
    Connect(#[source] BoxError),

    #[error("failed to persist event: {0}")]
    Write(#[source] BoxError),

    #[error("storage query failed: {0}")]
    Query(#[source] BoxError),

    #[error("stored content for {uuid} does not match its `{entry_type}` tag")]
    Corrupt { uuid: Uuid, entry_type: String },
}

impl StoreError {
    pub fn connect(e: impl Into<BoxError>) -> Self {
        StoreError::Connect(e.into())
    }

    pub fn write(e: impl Into<BoxError>) -> Self {
        StoreError::Write(e.into())
    }

    pub fn query(e: impl Into<BoxError>) -> Self {
        StoreError::Query(e.into())
    }
}

/// What the relational backends keep in the JSON content column: the tagged
/// payload plus the optional call-site hint, so the row schema stays exactly
/// uuid / correlation ids / type / content / created_at.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct StoredContent {
    #[serde(flatten)]
    pub content: EventContent,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<CallSite>,
}

/// The storage contract every backend implements.
///
/// `list` returns events of one type ordered `created_at` descending with
/// `uuid` descending as the tiebreak - the stable sort key instance-mode
/// pagination relies on. `related` returns events of every type sharing a
/// populated correlation id, oldest first.
#[async_trait]
pub trait StorageAdapter: Send + Sync {
    /// Idempotent schema bootstrap: running it against an already-initialized
    /// store is a no-op, not an error.
    async fn setup(&self) -> Result<(), StoreError>;

    /// Persist one immutable event.
    async fn append(&self, event: &Event) -> Result<(), StoreError>;

    /// Fetch one event by uuid, across all types.
    async fn find(&self, uuid: Uuid) -> Result<Option<Event>, StoreError>;

    /// Events of one type, newest first, optionally bounded below by
    /// `created_at >= since`.
    async fn list(
        &self,
        entry_type: EntryType,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<Event>, StoreError>;

    /// Events of every type sharing a populated id with the triple, oldest
    /// first. An all-absent triple yields an empty set.
    async fn related(&self, ids: &CorrelationIds) -> Result<Vec<Event>, StoreError>;

    /// Delete events captured before the cutoff; returns the count removed.
    /// Consumed by the (external) retention job.
    async fn prune(&self, before: DateTime<Utc>) -> Result<u64, StoreError>;
}

/// Open the backend named by configuration and bootstrap its schema.
pub async fn connect(settings: &StorageSettings) -> Result<Arc<dyn StorageAdapter>, StoreError> {
    let store: Arc<dyn StorageAdapter> = match settings.driver {
        StorageDriver::Memory => Arc::new(MemoryStore::new()),
        StorageDriver::Sqlite => Arc::new(SqliteStore::connect(&settings.url).await?),
        StorageDriver::Postgres => Arc::new(PostgresStore::connect(&settings.url).await?),
    };
    store.setup().await?;
    Ok(store)
}
