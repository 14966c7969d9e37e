//! Job watcher - dispatch-side events and scoped job runs

use periscope_core::events::{CallSite, ErrorInfo};
use periscope_core::normalize::{self, RawJob};
use periscope_core::{context, Kind, Recorder};
use std::fmt::Display;
use std::future::Future;
use std::time::Instant;
use uuid::Uuid;

/// Records job dispatches and runs as `job` events
#[derive(Debug, Clone)]
pub struct JobWatcher {
    recorder: Recorder,
}

impl JobWatcher {
    pub fn new(recorder: Recorder) -> Self {
        Self { recorder }
    }

    /// Record that a job was queued. Dispatch events carry the dispatching
    /// scope (the request that queued the job), not a job scope of their own.
    #[track_caller]
    pub fn dispatched(&self, name: &str, queue: &str) {
        self.recorder
            .record_at(normalize::job_dispatched(name, queue), Some(CallSite::caller()));
    }

    /// Run a job inside a fresh job scope. Events captured while it executes
    /// (queries, cache lookups) correlate to this run; the run itself is
    /// recorded on completion.
    pub async fn run<T, E, F, Fut>(
        &self,
        name: &str,
        queue: &str,
        attempts: u32,
        f: F,
    ) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let job_id = Uuid::new_v4().to_string();
        let recorder = self.recorder.clone();
        let name = name.to_string();
        let queue = queue.to_string();
        context::scope(Kind::Job, job_id, async move {
            let started = Instant::now();
            let result = f().await;
            let error = result
                .as_ref()
                .err()
                .map(|e| ErrorInfo::new(std::any::type_name::<E>(), e.to_string()));
            recorder.record_at(
                normalize::job(RawJob {
                    name,
                    queue,
                    attempts,
                    error,
                    duration: started.elapsed(),
                }),
                None,
            );
            result
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use periscope_core::channel;
    use periscope_core::events::{EventContent, JobStatus};

    #[tokio::test]
    async fn test_run_correlates_captured_events_to_the_job() {
        let (recorder, mut rx) = channel(16);
        let watcher = JobWatcher::new(recorder.clone());

        watcher
            .run("RebuildIndex", "maintenance", 1, || async {
                // a capture from inside the job body
                recorder.record(normalize::model(
                    periscope_core::events::ModelAction::Updated,
                    "IndexEntry",
                ));
                Ok::<_, std::io::Error>(())
            })
            .await
            .unwrap();

        let inner = rx.recv().await.unwrap();
        let job = rx.recv().await.unwrap();
        assert!(inner.correlation.job_id.is_some());
        assert_eq!(inner.correlation.job_id, job.correlation.job_id);

        let EventContent::Job(c) = &job.content else {
            panic!("expected job content");
        };
        assert_eq!(c.status, JobStatus::Completed);
        assert_eq!(c.attempts, 1);
    }

    #[tokio::test]
    async fn test_failed_run_records_failure_and_propagates() {
        let (recorder, mut rx) = channel(8);
        let watcher = JobWatcher::new(recorder);

        let result: Result<(), std::io::Error> = watcher
            .run("SendWelcomeEmail", "emails", 3, || async {
                Err(std::io::Error::other("smtp relay unavailable"))
            })
            .await;
        assert!(result.is_err());

        let event = rx.recv().await.unwrap();
        let EventContent::Job(c) = &event.content else {
            panic!("expected job content");
        };
        assert_eq!(c.status, JobStatus::Failed);
        assert!(c.error.is_some());
    }

    #[tokio::test]
    async fn test_dispatch_carries_the_dispatching_scope() {
        let (recorder, mut rx) = channel(8);
        let watcher = JobWatcher::new(recorder);

        context::scope(Kind::Request, "req-9", async {
            watcher.dispatched("SendWelcomeEmail", "emails");
        })
        .await;

        let event = rx.recv().await.unwrap();
        assert_eq!(event.correlation.request_id.as_deref(), Some("req-9"));
        let EventContent::Job(c) = &event.content else {
            panic!("expected job content");
        };
        assert_eq!(c.status, JobStatus::Queued);
    }
}
