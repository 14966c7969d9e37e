//! Capture channel - the fire-and-forget hand-off from watchers to storage
//!
//! A [`Recorder`] is the cheap, cloneable handle watchers record through.
//! `record` never blocks and never fails the caller: a full buffer drops the
//! event with a debug log, because instrumentation must not alter the
//! behavior or timing of the instrumented application.

use crate::events::{CallSite, Event, EventContent};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::debug;

/// Default capture buffer size
pub const DEFAULT_BUFFER_SIZE: usize = 4096;

/// Internal capture failures - always recovered locally, never propagated to
/// the instrumented call site
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("capture buffer full, event dropped")]
    BufferFull,

    #[error("capture channel closed, event dropped")]
    Closed,
}

/// Cloneable recording handle
#[derive(Debug, Clone)]
pub struct Recorder {
    tx: mpsc::Sender<Event>,
}

/// Create a capture channel. The receiver is handed to a writer task that
/// drains events into a storage adapter.
pub fn channel(buffer: usize) -> (Recorder, mpsc::Receiver<Event>) {
    let (tx, rx) = mpsc::channel(buffer.max(1));
    (Recorder { tx }, rx)
}

impl Recorder {
    /// Record one normalized event under the active correlation scope.
    ///
    /// Non-blocking; capture failures are swallowed and logged.
    #[track_caller]
    pub fn record(&self, content: EventContent) {
        self.record_at(content, Some(CallSite::caller()));
    }

    /// Record with an explicit call-site hint (or none).
    pub fn record_at(&self, content: EventContent, origin: Option<CallSite>) {
        let event = Event::capture(content, origin);
        if let Err(e) = self.try_record(event) {
            debug!(target: "periscope_core::capture", error = %e, "capture dropped");
        }
    }

    fn try_record(&self, event: Event) -> Result<(), CaptureError> {
        self.tx.try_send(event).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => CaptureError::BufferFull,
            mpsc::error::TrySendError::Closed(_) => CaptureError::Closed,
        })
    }
}
