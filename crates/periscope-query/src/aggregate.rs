//! Aggregation primitives - outcome counting, averages, percentiles, buckets
//!
//! Aggregates are computed here, in one place, rather than pushed down into
//! the storage adapters, so every backend produces identical results by
//! construction.

use crate::period::SERIES_BUCKETS;
use chrono::{DateTime, Duration, Utc};
use periscope_core::events::{Event, Outcome, StatusClass};
use serde::Serialize;

/// Per-outcome event counts. Sub-counts always sum to the total of the
/// events observed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OutcomeCounts {
    #[serde(rename = "1xx")]
    pub informational: u64,
    #[serde(rename = "2xx")]
    pub success: u64,
    #[serde(rename = "3xx")]
    pub redirect: u64,
    #[serde(rename = "4xx")]
    pub client_error: u64,
    #[serde(rename = "5xx")]
    pub server_error: u64,
    pub completed: u64,
    pub failed: u64,
}

impl OutcomeCounts {
    pub fn observe(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Status(StatusClass::Informational) => self.informational += 1,
            Outcome::Status(StatusClass::Success) => self.success += 1,
            Outcome::Status(StatusClass::Redirect) => self.redirect += 1,
            Outcome::Status(StatusClass::ClientError) => self.client_error += 1,
            Outcome::Status(StatusClass::ServerError) => self.server_error += 1,
            Outcome::Completed => self.completed += 1,
            Outcome::Failed => self.failed += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.informational
            + self.success
            + self.redirect
            + self.client_error
            + self.server_error
            + self.completed
            + self.failed
    }
}

/// Arithmetic mean; 0 for an empty set
pub fn average(durations: &[f64]) -> f64 {
    if durations.is_empty() {
        return 0.0;
    }
    durations.iter().sum::<f64>() / durations.len() as f64
}

/// Nearest-rank percentile: the value at index ceil(p * n) - 1 of the
/// ascending sort. Always an observed value, never interpolated; 0 for an
/// empty set.
pub fn percentile(durations: &[f64], p: f64) -> f64 {
    if durations.is_empty() {
        return 0.0;
    }
    let mut sorted = durations.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let rank = (p * sorted.len() as f64).ceil() as usize;
    sorted[rank.saturating_sub(1).min(sorted.len() - 1)]
}

pub fn p95(durations: &[f64]) -> f64 {
    percentile(durations, 0.95)
}

/// One row of a group-mode aggregate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSummary {
    pub key: String,
    pub count: u64,
    pub outcomes: OutcomeCounts,
    pub average_ms: f64,
    pub p95_ms: f64,
}

/// One bucket of a time series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesBucket {
    /// Inclusive start of the bucket's sub-window
    pub start: DateTime<Utc>,
    pub count: u64,
    pub outcomes: OutcomeCounts,
}

/// Divide `window` (ending at `end`) into [`SERIES_BUCKETS`] equal buckets
/// and count `events` into them. Events outside the window are skipped.
pub fn bucketize(events: &[Event], end: DateTime<Utc>, window: Duration) -> Vec<SeriesBucket> {
    let start = end - window;
    let total_ms = window.num_milliseconds().max(1);
    let bucket_ms = total_ms / SERIES_BUCKETS as i64;

    let mut buckets: Vec<SeriesBucket> = (0..SERIES_BUCKETS)
        .map(|i| SeriesBucket {
            start: start + Duration::milliseconds(bucket_ms * i as i64),
            count: 0,
            outcomes: OutcomeCounts::default(),
        })
        .collect();

    for event in events {
        if event.created_at < start || event.created_at > end {
            continue;
        }
        let offset_ms = (event.created_at - start).num_milliseconds();
        let idx = ((offset_ms * SERIES_BUCKETS as i64) / total_ms) as usize;
        let idx = idx.min(SERIES_BUCKETS - 1);
        buckets[idx].count += 1;
        buckets[idx].outcomes.observe(event.content.outcome());
    }
    buckets
}

#[cfg(test)]
mod tests {
    use super::*;
    use periscope_core::events::{
        truncate_to_millis, CompletionStatus, EventContent, QueryContent,
    };
    use periscope_core::CorrelationIds;
    use uuid::Uuid;

    fn query_at(created_at: DateTime<Utc>) -> Event {
        Event {
            uuid: Uuid::new_v4(),
            correlation: CorrelationIds::none(),
            content: EventContent::Query(QueryContent {
                sql: "SELECT 1".into(),
                sql_type: "SELECT".into(),
                connection: None,
                status: CompletionStatus::Completed,
                duration_ms: 1.0,
                error: None,
            }),
            origin: None,
            created_at,
        }
    }

    #[test]
    fn test_outcome_counts_sum_to_total() {
        let mut counts = OutcomeCounts::default();
        counts.observe(Outcome::Status(StatusClass::Success));
        counts.observe(Outcome::Status(StatusClass::ServerError));
        counts.observe(Outcome::Completed);
        counts.observe(Outcome::Failed);
        counts.observe(Outcome::Failed);
        assert_eq!(counts.total(), 5);
        assert_eq!(counts.success, 1);
        assert_eq!(counts.failed, 2);
    }

    #[test]
    fn test_percentile_nearest_rank() {
        let values: Vec<f64> = (1..=100).map(|v| v as f64).collect();
        assert_eq!(p95(&values), 95.0);

        // n = 10: ceil(0.95 * 10) = 10, so the maximum
        let ten: Vec<f64> = (1..=10).map(|v| v as f64).collect();
        assert_eq!(p95(&ten), 10.0);

        // single element: p95 is that element
        assert_eq!(p95(&[42.0]), 42.0);
        // always an observed value, never interpolated
        assert_eq!(percentile(&[1.0, 100.0], 0.5), 1.0);
    }

    #[test]
    fn test_average_empty_is_zero() {
        assert_eq!(average(&[]), 0.0);
        assert_eq!(p95(&[]), 0.0);
        assert_eq!(average(&[2.0, 4.0]), 3.0);
    }

    #[test]
    fn test_bucketize_places_events_and_preserves_totals() {
        let end = truncate_to_millis(Utc::now());
        let window = Duration::hours(24);

        // one event per hour boundary plus one at the window start
        let events: Vec<Event> = (0..24)
            .map(|h| query_at(end - Duration::hours(h) - Duration::minutes(30)))
            .collect();
        let buckets = bucketize(&events, end, window);
        assert_eq!(buckets.len(), SERIES_BUCKETS);
        assert_eq!(buckets.iter().map(|b| b.count).sum::<u64>(), 24);
        assert!(buckets.iter().all(|b| b.count == 1));
    }

    #[test]
    fn test_bucketize_skips_events_outside_window() {
        let end = truncate_to_millis(Utc::now());
        let events = vec![
            query_at(end - Duration::hours(30)),
            query_at(end - Duration::minutes(1)),
        ];
        let buckets = bucketize(&events, end, Duration::hours(24));
        assert_eq!(buckets.iter().map(|b| b.count).sum::<u64>(), 1);
        assert_eq!(buckets[SERIES_BUCKETS - 1].count, 1);
    }

    #[test]
    fn test_bucket_boundary_event_lands_in_last_bucket() {
        let end = truncate_to_millis(Utc::now());
        let events = vec![query_at(end)];
        let buckets = bucketize(&events, end, Duration::hours(24));
        assert_eq!(buckets[SERIES_BUCKETS - 1].count, 1);
    }
}
