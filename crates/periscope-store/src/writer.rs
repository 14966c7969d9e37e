//! Background writer - drains the capture channel into a storage adapter
//!
//! Persistence is fire-and-forget relative to the instrumented caller: a
//! failed append is logged and dropped (telemetry loss is acceptable,
//! application correctness is not).

use crate::StorageAdapter;
use periscope_core::events::Event;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Spawn the writer task. It exits when every `Recorder` clone is dropped
/// and the channel drains; the handle resolves to the number of events
/// persisted.
pub fn spawn_writer(
    store: Arc<dyn StorageAdapter>,
    mut rx: mpsc::Receiver<Event>,
) -> JoinHandle<u64> {
    tokio::spawn(async move {
        let mut written = 0u64;
        while let Some(event) = rx.recv().await {
            match store.append(&event).await {
                Ok(()) => written += 1,
                Err(e) => {
                    warn!(target: "periscope_store::writer", error = %e, uuid = %event.uuid, "failed to persist event, dropping");
                }
            }
        }
        debug!(target: "periscope_store::writer", written, "capture channel closed, writer exiting");
        written
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;
    use periscope_core::events::{EntryType, ModelAction};
    use periscope_core::{channel, normalize};

    #[tokio::test]
    async fn test_writer_persists_and_exits_on_close() {
        let store = Arc::new(MemoryStore::new());
        let (recorder, rx) = channel(16);
        let writer = spawn_writer(store.clone(), rx);

        recorder.record(normalize::model(ModelAction::Created, "User"));
        recorder.record(normalize::model(ModelAction::Deleted, "User"));
        drop(recorder);

        let written = writer.await.unwrap();
        assert_eq!(written, 2);
        let events = store.list(EntryType::Model, None).await.unwrap();
        assert_eq!(events.len(), 2);
    }
}
