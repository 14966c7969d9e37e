//! Query-layer errors

use periscope_store::StoreError;
use thiserror::Error;
use uuid::Uuid;

/// Errors surfaced by the query engine
#[derive(Debug, Error)]
pub enum QueryError {
    /// A filter parameter could not be parsed (caller error)
    #[error("invalid filter: {0}")]
    InvalidFilter(String),

    /// No event with the requested id
    #[error("no event with uuid {0}")]
    NotFound(Uuid),

    /// The storage backend failed
    #[error("storage error")]
    Storage(#[from] StoreError),
}
