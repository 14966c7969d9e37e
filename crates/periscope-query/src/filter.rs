//! Instance and group query parameters

use crate::{Period, QueryError};
use periscope_core::events::{EventContent, Outcome, StatusClass};

/// Default page size for instance queries
pub const DEFAULT_LIMIT: usize = 50;

/// Status-dimension filter for instance queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Class(StatusClass),
    Completed,
    Failed,
}

impl StatusFilter {
    pub fn parse(s: &str) -> Result<Self, QueryError> {
        match s {
            "all" => Ok(StatusFilter::All),
            "1xx" => Ok(StatusFilter::Class(StatusClass::Informational)),
            "2xx" => Ok(StatusFilter::Class(StatusClass::Success)),
            "3xx" => Ok(StatusFilter::Class(StatusClass::Redirect)),
            "4xx" => Ok(StatusFilter::Class(StatusClass::ClientError)),
            "5xx" => Ok(StatusFilter::Class(StatusClass::ServerError)),
            "completed" => Ok(StatusFilter::Completed),
            "failed" => Ok(StatusFilter::Failed),
            other => Err(QueryError::InvalidFilter(format!(
                "unknown status {other:?}"
            ))),
        }
    }

    pub fn matches(&self, content: &EventContent) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Class(class) => content.outcome() == Outcome::Status(*class),
            StatusFilter::Completed => content.outcome() == Outcome::Completed,
            StatusFilter::Failed => content.outcome() == Outcome::Failed,
        }
    }
}

/// Parameters for an instance-mode (flat list) query
#[derive(Debug, Clone)]
pub struct InstanceQuery {
    pub period: Period,
    pub status: StatusFilter,
    /// Case-insensitive substring over the event's searchable text
    pub search: Option<String>,
    pub offset: usize,
    pub limit: usize,
}

impl Default for InstanceQuery {
    fn default() -> Self {
        Self {
            period: Period::default(),
            status: StatusFilter::default(),
            search: None,
            offset: 0,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl InstanceQuery {
    pub(crate) fn matches(&self, content: &EventContent) -> bool {
        if !self.status.matches(content) {
            return false;
        }
        match &self.search {
            Some(needle) => content
                .search_text()
                .to_lowercase()
                .contains(&needle.to_lowercase()),
            None => true,
        }
    }
}

/// Parameters for a group-mode (aggregate) query
#[derive(Debug, Clone, Default)]
pub struct GroupQuery {
    pub period: Period,
}
