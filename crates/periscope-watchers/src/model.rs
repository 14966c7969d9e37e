//! Model watcher - explicit hooks for entity lifecycle changes

use periscope_core::events::{CallSite, ModelAction};
use periscope_core::{normalize, Recorder};

/// Records entity create/update/delete hooks as `model` events
#[derive(Debug, Clone)]
pub struct ModelWatcher {
    recorder: Recorder,
}

impl ModelWatcher {
    pub fn new(recorder: Recorder) -> Self {
        Self { recorder }
    }

    #[track_caller]
    pub fn created(&self, model: &str) {
        self.record(ModelAction::Created, model, CallSite::caller());
    }

    #[track_caller]
    pub fn updated(&self, model: &str) {
        self.record(ModelAction::Updated, model, CallSite::caller());
    }

    #[track_caller]
    pub fn deleted(&self, model: &str) {
        self.record(ModelAction::Deleted, model, CallSite::caller());
    }

    fn record(&self, action: ModelAction, model: &str, origin: CallSite) {
        self.recorder
            .record_at(normalize::model(action, model), Some(origin));
    }
}
