//! The query engine - every dashboard read goes through here
//!
//! Adapters hand back raw type-filtered windows; filtering, pagination, and
//! aggregation all happen engine-side so the backends stay interchangeable.

use crate::aggregate::{self, GroupSummary, SeriesBucket};
use crate::{GroupQuery, InstanceQuery, QueryError};
use chrono::Utc;
use periscope_core::events::{EntryType, Event};
use periscope_store::StorageAdapter;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// One page of an instance-mode query
#[derive(Debug, Clone, Serialize)]
pub struct Page {
    pub events: Vec<Event>,
    /// Total matches before pagination
    pub total: usize,
    pub offset: usize,
    pub limit: usize,
}

/// A single event plus everything sharing its correlation scope
#[derive(Debug, Clone, Serialize)]
pub struct EventDetail {
    pub event: Event,
    pub related: Vec<Event>,
}

/// Read-side facade over a storage adapter
#[derive(Clone)]
pub struct QueryEngine {
    store: Arc<dyn StorageAdapter>,
}

impl QueryEngine {
    pub fn new(store: Arc<dyn StorageAdapter>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn StorageAdapter> {
        &self.store
    }

    /// Flat newest-first listing with status/search filters and pagination
    pub async fn instances(
        &self,
        entry_type: EntryType,
        query: &InstanceQuery,
    ) -> Result<Page, QueryError> {
        let since = Utc::now() - query.period.duration();
        let matched: Vec<Event> = self
            .store
            .list(entry_type, Some(since))
            .await?
            .into_iter()
            .filter(|e| query.matches(&e.content))
            .collect();

        let total = matched.len();
        let events: Vec<Event> = matched
            .into_iter()
            .skip(query.offset)
            .take(query.limit)
            .collect();
        debug!(target: "periscope_query", %entry_type, total, returned = events.len(), "instance query");
        Ok(Page {
            events,
            total,
            offset: query.offset,
            limit: query.limit,
        })
    }

    /// Fold the window into per-key summaries, most frequent first
    pub async fn groups(
        &self,
        entry_type: EntryType,
        query: &GroupQuery,
    ) -> Result<Vec<GroupSummary>, QueryError> {
        let since = Utc::now() - query.period.duration();
        let events = self.store.list(entry_type, Some(since)).await?;

        let mut by_key: BTreeMap<String, (Vec<f64>, aggregate::OutcomeCounts)> = BTreeMap::new();
        for event in &events {
            let entry = by_key.entry(event.content.group_key()).or_default();
            entry.0.push(event.content.duration_ms());
            entry.1.observe(event.content.outcome());
        }

        let mut summaries: Vec<GroupSummary> = by_key
            .into_iter()
            .map(|(key, (durations, outcomes))| GroupSummary {
                key,
                count: durations.len() as u64,
                outcomes,
                average_ms: aggregate::average(&durations),
                p95_ms: aggregate::p95(&durations),
            })
            .collect();
        summaries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.key.cmp(&b.key)));
        Ok(summaries)
    }

    /// Per-bucket counts over the window, oldest bucket first
    pub async fn series(
        &self,
        entry_type: EntryType,
        query: &GroupQuery,
    ) -> Result<Vec<SeriesBucket>, QueryError> {
        let window = query.period.duration();
        let end = Utc::now();
        let events = self.store.list(entry_type, Some(end - window)).await?;
        Ok(aggregate::bucketize(&events, end, window))
    }

    /// One event with its full correlation trace
    pub async fn detail(&self, uuid: Uuid) -> Result<EventDetail, QueryError> {
        let event = self
            .store
            .find(uuid)
            .await?
            .ok_or(QueryError::NotFound(uuid))?;
        let related = self.related_to(&event).await?;
        Ok(EventDetail { event, related })
    }

    /// Everything sharing the event's correlation scope, the event excluded,
    /// oldest first
    pub async fn related(&self, uuid: Uuid) -> Result<Vec<Event>, QueryError> {
        let event = self
            .store
            .find(uuid)
            .await?
            .ok_or(QueryError::NotFound(uuid))?;
        self.related_to(&event).await
    }

    /// Relation set for an explicit id triple, skipping the anchor fetch.
    /// An all-absent triple resolves to an empty set.
    pub async fn related_by(
        &self,
        ids: &periscope_core::CorrelationIds,
    ) -> Result<Vec<Event>, QueryError> {
        Ok(self.store.related(ids).await?)
    }

    async fn related_to(&self, event: &Event) -> Result<Vec<Event>, QueryError> {
        let mut related = self.store.related(&event.correlation).await?;
        related.retain(|e| e.uuid != event.uuid);
        Ok(related)
    }
}
