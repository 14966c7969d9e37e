//! Cache watcher - a drop-in decorator over any cache store
//!
//! Lookups record `hit` or `missed` depending on whether the key resolved,
//! writes record `set`, deletions record `forget`.

use async_trait::async_trait;
use periscope_core::events::CacheOperation;
use periscope_core::normalize::{self, RawCache};
use periscope_core::Recorder;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Instant;
use tokio::sync::RwLock;

/// The cache seam watchers decorate
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Option<Value>;
    async fn put(&self, key: &str, value: Value);
    /// Returns true when the key existed
    async fn forget(&self, key: &str) -> bool;
}

/// Simple in-process cache store
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, Value>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn get(&self, key: &str) -> Option<Value> {
        self.entries.read().await.get(key).cloned()
    }

    async fn put(&self, key: &str, value: Value) {
        self.entries.write().await.insert(key.to_string(), value);
    }

    async fn forget(&self, key: &str) -> bool {
        self.entries.write().await.remove(key).is_some()
    }
}

/// Records every operation against the wrapped store as a `cache` event
pub struct CacheWatcher<C> {
    inner: C,
    recorder: Recorder,
}

impl<C: CacheStore> CacheWatcher<C> {
    pub fn new(inner: C, recorder: Recorder) -> Self {
        Self { inner, recorder }
    }

    fn record(&self, operation: CacheOperation, key: &str, started: Instant) {
        self.recorder.record_at(
            normalize::cache(RawCache {
                operation,
                key: key.to_string(),
                duration: started.elapsed(),
            }),
            None,
        );
    }
}

#[async_trait]
impl<C: CacheStore> CacheStore for CacheWatcher<C> {
    async fn get(&self, key: &str) -> Option<Value> {
        let started = Instant::now();
        let value = self.inner.get(key).await;
        let operation = match value {
            Some(_) => CacheOperation::Hit,
            None => CacheOperation::Missed,
        };
        self.record(operation, key, started);
        value
    }

    async fn put(&self, key: &str, value: Value) {
        let started = Instant::now();
        self.inner.put(key, value).await;
        self.record(CacheOperation::Set, key, started);
    }

    async fn forget(&self, key: &str) -> bool {
        let started = Instant::now();
        let existed = self.inner.forget(key).await;
        self.record(CacheOperation::Forget, key, started);
        existed
    }
}
