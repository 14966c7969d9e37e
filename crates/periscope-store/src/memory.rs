//! In-memory storage adapter
//!
//! Document-style: events are kept whole, no serialization. The default
//! backend, and the one the query-engine test scenarios run against.

use crate::{StorageAdapter, StoreError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use periscope_core::events::{EntryType, Event};
use periscope_core::CorrelationIds;
use uuid::Uuid;

/// In-memory event store
#[derive(Debug, Default)]
pub struct MemoryStore {
    events: RwLock<Vec<Event>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of events currently held
    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }
}

#[async_trait]
impl StorageAdapter for MemoryStore {
    async fn setup(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn append(&self, event: &Event) -> Result<(), StoreError> {
        self.events.write().push(event.clone());
        Ok(())
    }

    async fn find(&self, uuid: Uuid) -> Result<Option<Event>, StoreError> {
        Ok(self.events.read().iter().find(|e| e.uuid == uuid).cloned())
    }

    async fn list(
        &self,
        entry_type: EntryType,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<Event>, StoreError> {
        let mut matched: Vec<Event> = self
            .events
            .read()
            .iter()
            .filter(|e| e.entry_type() == entry_type)
            .filter(|e| since.is_none_or(|cutoff| e.created_at >= cutoff))
            .cloned()
            .collect();
        matched.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.uuid.cmp(&a.uuid))
        });
        Ok(matched)
    }

    async fn related(&self, ids: &CorrelationIds) -> Result<Vec<Event>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut matched: Vec<Event> = self
            .events
            .read()
            .iter()
            .filter(|e| e.correlation.overlaps(ids))
            .cloned()
            .collect();
        matched.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.uuid.cmp(&b.uuid))
        });
        Ok(matched)
    }

    async fn prune(&self, before: DateTime<Utc>) -> Result<u64, StoreError> {
        let mut events = self.events.write();
        let len_before = events.len();
        events.retain(|e| e.created_at >= before);
        Ok((len_before - events.len()) as u64)
    }
}
