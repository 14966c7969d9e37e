//! Database query watcher - a combinator wrapped around any query future

use periscope_core::events::{CallSite, ErrorInfo};
use periscope_core::normalize::{self, RawQuery};
use periscope_core::Recorder;
use std::fmt::Display;
use std::future::Future;
use std::time::Instant;

/// Records observed queries as `query` events
#[derive(Debug, Clone)]
pub struct QueryWatcher {
    recorder: Recorder,
}

impl QueryWatcher {
    pub fn new(recorder: Recorder) -> Self {
        Self { recorder }
    }

    /// Time `f` and record it as a query event, passing its result through
    /// untouched.
    #[track_caller]
    pub fn observe<T, E, F>(
        &self,
        sql: impl Into<String>,
        connection: Option<String>,
        f: F,
    ) -> impl Future<Output = Result<T, E>>
    where
        F: Future<Output = Result<T, E>>,
        E: Display,
    {
        let origin = CallSite::caller();
        let recorder = self.recorder.clone();
        let sql = sql.into();
        async move {
            let started = Instant::now();
            let result = f.await;
            let error = result
                .as_ref()
                .err()
                .map(|e| ErrorInfo::new(std::any::type_name::<E>(), e.to_string()));
            recorder.record_at(
                normalize::query(RawQuery {
                    sql,
                    connection,
                    error,
                    duration: started.elapsed(),
                }),
                Some(origin),
            );
            result
        }
    }
}
