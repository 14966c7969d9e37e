//! View watcher - times template renders

use periscope_core::events::{CallSite, ErrorInfo};
use periscope_core::normalize::{self, RawView};
use periscope_core::Recorder;
use std::fmt::Display;
use std::future::Future;
use std::time::Instant;

/// Records observed renders as `view` events
#[derive(Debug, Clone)]
pub struct ViewWatcher {
    recorder: Recorder,
}

impl ViewWatcher {
    pub fn new(recorder: Recorder) -> Self {
        Self { recorder }
    }

    /// Time an async render and record it, passing its result through.
    #[track_caller]
    pub fn observe<T, E, F>(
        &self,
        name: impl Into<String>,
        path: Option<String>,
        f: F,
    ) -> impl Future<Output = Result<T, E>>
    where
        F: Future<Output = Result<T, E>>,
        E: Display,
    {
        let origin = CallSite::caller();
        let recorder = self.recorder.clone();
        let name = name.into();
        async move {
            let started = Instant::now();
            let result = f.await;
            record(&recorder, name, path, &result, started, origin);
            result
        }
    }

    /// Synchronous variant for template engines that render inline.
    #[track_caller]
    pub fn observe_sync<T, E: Display>(
        &self,
        name: impl Into<String>,
        path: Option<String>,
        f: impl FnOnce() -> Result<T, E>,
    ) -> Result<T, E> {
        let origin = CallSite::caller();
        let started = Instant::now();
        let result = f();
        record(&self.recorder, name.into(), path, &result, started, origin);
        result
    }
}

fn record<T, E: Display>(
    recorder: &Recorder,
    name: String,
    path: Option<String>,
    result: &Result<T, E>,
    started: Instant,
    origin: CallSite,
) {
    let error = result
        .as_ref()
        .err()
        .map(|e| ErrorInfo::new(std::any::type_name::<E>(), e.to_string()));
    recorder.record_at(
        normalize::view(RawView {
            name,
            path,
            error,
            duration: started.elapsed(),
        }),
        Some(origin),
    );
}
