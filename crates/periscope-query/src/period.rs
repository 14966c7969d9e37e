//! Time windows for aggregate queries

use crate::QueryError;
use chrono::Duration;

/// Number of equal buckets a series window is divided into
pub const SERIES_BUCKETS: usize = 24;

/// Sliding time window, anchored at "now" when a query executes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Period {
    Hour,
    #[default]
    Day,
    Week,
    TwoWeeks,
    Month,
}

impl Period {
    /// Parse the dashboard's window tokens
    pub fn parse(s: &str) -> Result<Self, QueryError> {
        match s {
            "1h" => Ok(Period::Hour),
            "24h" => Ok(Period::Day),
            "7d" => Ok(Period::Week),
            "14d" => Ok(Period::TwoWeeks),
            "30d" => Ok(Period::Month),
            other => Err(QueryError::InvalidFilter(format!(
                "unknown period {other:?}, expected one of 1h, 24h, 7d, 14d, 30d"
            ))),
        }
    }

    pub fn duration(&self) -> Duration {
        match self {
            Period::Hour => Duration::hours(1),
            Period::Day => Duration::hours(24),
            Period::Week => Duration::days(7),
            Period::TwoWeeks => Duration::days(14),
            Period::Month => Duration::days(30),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Hour => "1h",
            Period::Day => "24h",
            Period::Week => "7d",
            Period::TwoWeeks => "14d",
            Period::Month => "30d",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_tokens_round_trip() {
        for token in ["1h", "24h", "7d", "14d", "30d"] {
            let period = Period::parse(token).unwrap();
            assert_eq!(period.as_str(), token);
        }
    }

    #[test]
    fn test_unknown_period_is_invalid_filter() {
        assert!(matches!(
            Period::parse("2h"),
            Err(QueryError::InvalidFilter(_))
        ));
    }

    #[test]
    fn test_default_window_is_24h() {
        assert_eq!(Period::default(), Period::Day);
        assert_eq!(Period::default().duration(), Duration::hours(24));
    }
}
