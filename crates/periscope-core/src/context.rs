//! Correlation context carrier
//!
//! Tracks which inbound request, queued job, or scheduled run is currently
//! executing so events captured deeper in the call stack are tagged with the
//! right correlation id. The carrier is a task-local value, never global
//! mutable state: it follows awaited continuations inside a scope and is
//! invisible to concurrent tasks. Scopes nest; the innermost one wins.

use serde::{Deserialize, Serialize};
use std::future::Future;

tokio::task_local! {
    static ACTIVE: CorrelationIds;
}

/// Which kind of traced unit of work a scope belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Request,
    Job,
    Schedule,
}

/// The correlation id triple - at most one populated
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrelationIds {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule_id: Option<String>,
}

impl CorrelationIds {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn request(id: impl Into<String>) -> Self {
        Self {
            request_id: Some(id.into()),
            ..Self::default()
        }
    }

    pub fn job(id: impl Into<String>) -> Self {
        Self {
            job_id: Some(id.into()),
            ..Self::default()
        }
    }

    pub fn schedule(id: impl Into<String>) -> Self {
        Self {
            schedule_id: Some(id.into()),
            ..Self::default()
        }
    }

    pub fn for_kind(kind: Kind, id: impl Into<String>) -> Self {
        match kind {
            Kind::Request => Self::request(id),
            Kind::Job => Self::job(id),
            Kind::Schedule => Self::schedule(id),
        }
    }

    /// True when no id is populated
    pub fn is_empty(&self) -> bool {
        self.request_id.is_none() && self.job_id.is_none() && self.schedule_id.is_none()
    }

    /// True when the two triples share at least one populated id
    pub fn overlaps(&self, other: &Self) -> bool {
        fn same(a: &Option<String>, b: &Option<String>) -> bool {
            matches!((a, b), (Some(x), Some(y)) if x == y)
        }
        same(&self.request_id, &other.request_id)
            || same(&self.job_id, &other.job_id)
            || same(&self.schedule_id, &other.schedule_id)
    }
}

/// Run a future inside a fresh correlation scope.
///
/// The previous scope (if any) is restored when the future completes; events
/// captured while it runs carry the given id.
pub async fn scope<F: Future>(kind: Kind, id: impl Into<String>, f: F) -> F::Output {
    ACTIVE.scope(CorrelationIds::for_kind(kind, id), f).await
}

/// Run a future inside an explicit id triple, e.g. to hand the current scope
/// to an explicitly spawned task.
pub async fn scope_with<F: Future>(ids: CorrelationIds, f: F) -> F::Output {
    ACTIVE.scope(ids, f).await
}

/// Synchronous variant of [`scope`] for non-async capture paths.
pub fn scope_sync<T>(kind: Kind, id: impl Into<String>, f: impl FnOnce() -> T) -> T {
    ACTIVE.sync_scope(CorrelationIds::for_kind(kind, id), f)
}

/// The innermost active correlation triple; all-absent outside any scope.
/// Total - never panics, inside or outside a runtime.
pub fn current() -> CorrelationIds {
    ACTIVE.try_with(Clone::clone).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_outside_scope_is_empty() {
        assert!(current().is_empty());
    }

    #[tokio::test]
    async fn test_scope_tags_and_restores() {
        assert!(current().is_empty());
        scope(Kind::Request, "req-1", async {
            assert_eq!(current().request_id.as_deref(), Some("req-1"));
            assert!(current().job_id.is_none());
        })
        .await;
        assert!(current().is_empty());
    }

    #[tokio::test]
    async fn test_innermost_scope_wins() {
        scope(Kind::Request, "req-1", async {
            scope(Kind::Job, "job-1", async {
                let ids = current();
                assert_eq!(ids.job_id.as_deref(), Some("job-1"));
                // at most one id is populated - the inner scope replaces, not merges
                assert!(ids.request_id.is_none());
            })
            .await;
            assert_eq!(current().request_id.as_deref(), Some("req-1"));
        })
        .await;
    }

    #[tokio::test]
    async fn test_concurrent_scopes_do_not_bleed() {
        let a = tokio::spawn(scope(Kind::Request, "req-a", async {
            for _ in 0..16 {
                tokio::task::yield_now().await;
                assert_eq!(current().request_id.as_deref(), Some("req-a"));
            }
        }));
        let b = tokio::spawn(scope(Kind::Job, "job-b", async {
            for _ in 0..16 {
                tokio::task::yield_now().await;
                assert_eq!(current().job_id.as_deref(), Some("job-b"));
            }
        }));
        a.await.unwrap();
        b.await.unwrap();
    }

    #[test]
    fn test_overlaps() {
        let anchor = CorrelationIds::request("r1");
        assert!(anchor.overlaps(&CorrelationIds::request("r1")));
        assert!(!anchor.overlaps(&CorrelationIds::request("r2")));
        assert!(!anchor.overlaps(&CorrelationIds::job("r1")));
        assert!(!anchor.overlaps(&CorrelationIds::none()));
    }
}
