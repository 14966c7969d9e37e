//! SQLite storage adapter
//!
//! Row table with a JSON text content column and millisecond-epoch
//! timestamps. The pool is pinned to a single connection so `sqlite::memory:`
//! databases (which are per-connection) behave like any other backend.

use crate::{StorageAdapter, StoreError, StoredContent};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use periscope_core::events::{EntryType, Event};
use periscope_core::CorrelationIds;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use std::str::FromStr;
use uuid::Uuid;

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS periscope_events (
        uuid TEXT PRIMARY KEY,
        request_id TEXT,
        job_id TEXT,
        schedule_id TEXT,
        entry_type TEXT NOT NULL,
        content TEXT NOT NULL,
        created_at INTEGER NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_periscope_events_type ON periscope_events (entry_type)",
    "CREATE INDEX IF NOT EXISTS idx_periscope_events_created_at ON periscope_events (created_at)",
    "CREATE INDEX IF NOT EXISTS idx_periscope_events_request_id ON periscope_events (request_id)",
    "CREATE INDEX IF NOT EXISTS idx_periscope_events_job_id ON periscope_events (job_id)",
    "CREATE INDEX IF NOT EXISTS idx_periscope_events_schedule_id ON periscope_events (schedule_id)",
];

const COLUMNS: &str =
    "uuid, request_id, job_id, schedule_id, entry_type, content, created_at";

/// SQLite-backed event store
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (or create) the database at `url`, e.g. `sqlite://periscope.db`
    /// or `sqlite::memory:`.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(StoreError::connect)?
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(StoreError::connect)?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn row_to_event(row: &SqliteRow) -> Result<Event, StoreError> {
    let uuid_text: String = row.try_get("uuid").map_err(StoreError::query)?;
    let uuid = Uuid::parse_str(&uuid_text).map_err(StoreError::query)?;
    let entry_type: String = row.try_get("entry_type").map_err(StoreError::query)?;
    let content_json: String = row.try_get("content").map_err(StoreError::query)?;
    let created_ms: i64 = row.try_get("created_at").map_err(StoreError::query)?;

    let stored: StoredContent =
        serde_json::from_str(&content_json).map_err(|_| StoreError::Corrupt {
            uuid,
            entry_type: entry_type.clone(),
        })?;
    if stored.content.entry_type().as_str() != entry_type {
        return Err(StoreError::Corrupt { uuid, entry_type });
    }
    let created_at = DateTime::from_timestamp_millis(created_ms).ok_or(StoreError::Corrupt {
        uuid,
        entry_type: entry_type.clone(),
    })?;

    Ok(Event {
        uuid,
        correlation: CorrelationIds {
            request_id: row.try_get("request_id").map_err(StoreError::query)?,
            job_id: row.try_get("job_id").map_err(StoreError::query)?,
            schedule_id: row.try_get("schedule_id").map_err(StoreError::query)?,
        },
        content: stored.content,
        origin: stored.origin,
        created_at,
    })
}

#[async_trait]
impl StorageAdapter for SqliteStore {
    async fn setup(&self) -> Result<(), StoreError> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(StoreError::connect)?;
        }
        Ok(())
    }

    async fn append(&self, event: &Event) -> Result<(), StoreError> {
        let stored = StoredContent {
            content: event.content.clone(),
            origin: event.origin.clone(),
        };
        let content_json = serde_json::to_string(&stored).map_err(StoreError::write)?;
        sqlx::query(
            "INSERT INTO periscope_events (uuid, request_id, job_id, schedule_id, entry_type, content, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(event.uuid.to_string())
        .bind(&event.correlation.request_id)
        .bind(&event.correlation.job_id)
        .bind(&event.correlation.schedule_id)
        .bind(event.entry_type().as_str())
        .bind(content_json)
        .bind(event.created_at.timestamp_millis())
        .execute(&self.pool)
        .await
        .map_err(StoreError::write)?;
        Ok(())
    }

    async fn find(&self, uuid: Uuid) -> Result<Option<Event>, StoreError> {
        let sql = format!("SELECT {COLUMNS} FROM periscope_events WHERE uuid = ?");
        let row = sqlx::query(&sql)
            .bind(uuid.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::query)?;
        row.as_ref().map(row_to_event).transpose()
    }

    async fn list(
        &self,
        entry_type: EntryType,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<Event>, StoreError> {
        let rows = match since {
            Some(cutoff) => {
                let sql = format!(
                    "SELECT {COLUMNS} FROM periscope_events
                     WHERE entry_type = ? AND created_at >= ?
                     ORDER BY created_at DESC, uuid DESC"
                );
                sqlx::query(&sql)
                    .bind(entry_type.as_str())
                    .bind(cutoff.timestamp_millis())
                    .fetch_all(&self.pool)
                    .await
            }
            None => {
                let sql = format!(
                    "SELECT {COLUMNS} FROM periscope_events
                     WHERE entry_type = ?
                     ORDER BY created_at DESC, uuid DESC"
                );
                sqlx::query(&sql)
                    .bind(entry_type.as_str())
                    .fetch_all(&self.pool)
                    .await
            }
        }
        .map_err(StoreError::query)?;
        rows.iter().map(row_to_event).collect()
    }

    async fn related(&self, ids: &CorrelationIds) -> Result<Vec<Event>, StoreError> {
        let mut clauses = Vec::new();
        let mut binds = Vec::new();
        if let Some(id) = &ids.request_id {
            clauses.push("request_id = ?");
            binds.push(id.clone());
        }
        if let Some(id) = &ids.job_id {
            clauses.push("job_id = ?");
            binds.push(id.clone());
        }
        if let Some(id) = &ids.schedule_id {
            clauses.push("schedule_id = ?");
            binds.push(id.clone());
        }
        if clauses.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            "SELECT {COLUMNS} FROM periscope_events
             WHERE {}
             ORDER BY created_at ASC, uuid ASC",
            clauses.join(" OR ")
        );
        let mut query = sqlx::query(&sql);
        for bind in binds {
            query = query.bind(bind);
        }
        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(StoreError::query)?;
        rows.iter().map(row_to_event).collect()
    }

    async fn prune(&self, before: DateTime<Utc>) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM periscope_events WHERE created_at < ?")
            .bind(before.timestamp_millis())
            .execute(&self.pool)
            .await
            .map_err(StoreError::write)?;
        Ok(result.rows_affected())
    }
}
