//! Schedule watcher - scoped runs of cron-expression tasks

use chrono::{DateTime, Utc};
use cron::Schedule;
use periscope_core::events::ErrorInfo;
use periscope_core::normalize::{self, RawSchedule};
use periscope_core::{context, Kind, Recorder};
use std::fmt::Display;
use std::future::Future;
use std::str::FromStr;
use std::time::Instant;
use uuid::Uuid;

/// The next fire time of a cron expression; None when it does not parse or
/// never fires again
pub fn next_occurrence(expression: &str) -> Option<DateTime<Utc>> {
    Schedule::from_str(expression).ok()?.upcoming(Utc).next()
}

/// Records scheduled-task runs as `schedule` events
#[derive(Debug, Clone)]
pub struct ScheduleWatcher {
    recorder: Recorder,
}

impl ScheduleWatcher {
    pub fn new(recorder: Recorder) -> Self {
        Self { recorder }
    }

    /// Run one occurrence of a scheduled task inside a fresh schedule scope.
    pub async fn run<T, E, F, Fut>(&self, name: &str, expression: &str, f: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let schedule_id = Uuid::new_v4().to_string();
        let recorder = self.recorder.clone();
        let name = name.to_string();
        let expression = expression.to_string();
        context::scope(Kind::Schedule, schedule_id, async move {
            let started = Instant::now();
            let result = f().await;
            let error = result
                .as_ref()
                .err()
                .map(|e| ErrorInfo::new(std::any::type_name::<E>(), e.to_string()));
            let next_due = next_occurrence(&expression);
            recorder.record_at(
                normalize::schedule(RawSchedule {
                    name,
                    expression,
                    next_due,
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
    use periscope_core::events::{CompletionStatus, EventContent};

    #[test]
    fn test_next_occurrence_parses_cron() {
        // every minute, 7-field cron
        let next = next_occurrence("0 * * * * * *").unwrap();
        assert!(next > Utc::now());
        assert!(next_occurrence("not a cron line").is_none());
    }

    #[tokio::test]
    async fn test_run_records_scoped_schedule_event() {
        let (recorder, mut rx) = channel(8);
        let watcher = ScheduleWatcher::new(recorder.clone());

        watcher
            .run("prune-old-events", "0 0 * * * * *", || async {
                recorder.record(normalize::model(
                    periscope_core::events::ModelAction::Deleted,
                    "Event",
                ));
                Ok::<_, std::io::Error>(())
            })
            .await
            .unwrap();

        let inner = rx.recv().await.unwrap();
        let run = rx.recv().await.unwrap();
        assert!(inner.correlation.schedule_id.is_some());
        assert_eq!(inner.correlation.schedule_id, run.correlation.schedule_id);

        let EventContent::Schedule(c) = &run.content else {
            panic!("expected schedule content");
        };
        assert_eq!(c.status, CompletionStatus::Completed);
        assert!(c.next_due.is_some());
    }
}
