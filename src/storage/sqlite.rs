//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::spider::{Record, Skip, SkipReason};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::{RunRecord, RunStatus, StoredRecord};
use crate::url::PageKind;
use crate::DrivelogError;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::HashMap;
use std::path::Path;

const RUN_COLUMNS: &str = "id, started_at, finished_at, config_hash, subject, status";
const RECORD_COLUMNS: &str =
    "url, kind, parent, origin, title, published, payload, run_id, emitted_at";

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(DrivelogError)` - Failed to open database
    pub fn new(path: &Path) -> Result<Self, DrivelogError> {
        let conn = Connection::open(path)?;

        // Configure SQLite for better performance
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> Result<Self, DrivelogError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

fn run_from_row(row: &Row<'_>) -> rusqlite::Result<RunRecord> {
    Ok(RunRecord {
        id: row.get(0)?,
        started_at: row.get(1)?,
        finished_at: row.get(2)?,
        config_hash: row.get(3)?,
        subject: row.get(4)?,
        status: RunStatus::from_db_string(&row.get::<_, String>(5)?)
            .unwrap_or(RunStatus::Running),
    })
}

/// A records row before its kind and payload are decoded
struct RawRecord {
    url: String,
    kind: String,
    parent: Option<String>,
    origin: Option<String>,
    title: Option<String>,
    published: Option<String>,
    payload: String,
    run_id: i64,
    emitted_at: String,
}

impl RawRecord {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            url: row.get(0)?,
            kind: row.get(1)?,
            parent: row.get(2)?,
            origin: row.get(3)?,
            title: row.get(4)?,
            published: row.get(5)?,
            payload: row.get(6)?,
            run_id: row.get(7)?,
            emitted_at: row.get(8)?,
        })
    }

    fn decode(self) -> StorageResult<StoredRecord> {
        let kind = PageKind::from_db_string(&self.kind)
            .ok_or_else(|| StorageError::Database(format!("Unknown record kind {}", self.kind)))?;
        let record: Record = serde_json::from_str(&self.payload)?;

        Ok(StoredRecord {
            url: self.url,
            kind,
            parent: self.parent,
            origin: self.origin,
            title: self.title,
            published: self.published,
            run_id: self.run_id,
            emitted_at: self.emitted_at,
            record,
        })
    }
}

impl Storage for SqliteStorage {
    // ===== Run Management =====

    fn create_run(&mut self, config_hash: &str, subject: Option<&str>) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO runs (started_at, config_hash, subject, status) VALUES (?1, ?2, ?3, ?4)",
            params![now, config_hash, subject, RunStatus::Running.to_db_string()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM runs WHERE id = ?1", RUN_COLUMNS),
                params![run_id],
                run_from_row,
            )
            .optional()?
            .ok_or(StorageError::RunNotFound(run_id))
    }

    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>> {
        let run = self
            .conn
            .query_row(
                &format!("SELECT {} FROM runs ORDER BY id DESC LIMIT 1", RUN_COLUMNS),
                [],
                run_from_row,
            )
            .optional()?;

        Ok(run)
    }

    fn finish_run(&mut self, run_id: i64, status: RunStatus) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let updated = self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2 WHERE id = ?3",
            params![status.to_db_string(), now, run_id],
        )?;

        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    // ===== Records =====

    fn upsert_record(&mut self, run_id: i64, record: &Record) -> StorageResult<()> {
        let payload = serde_json::to_string(record)?;
        let now = Utc::now().to_rfc3339();

        self.conn.execute(
            "INSERT INTO records (url, kind, parent, origin, title, published, payload, run_id, emitted_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
             ON CONFLICT(url) DO UPDATE SET
                kind = excluded.kind,
                parent = excluded.parent,
                origin = excluded.origin,
                title = excluded.title,
                published = excluded.published,
                payload = excluded.payload,
                run_id = excluded.run_id,
                emitted_at = excluded.emitted_at
             WHERE excluded.parent IS NOT NULL OR records.parent IS NULL",
            params![
                record.url().as_str(),
                record.kind().to_db_string(),
                record.parent().map(|u| u.as_str()),
                record.origin().map(|u| u.as_str()),
                record.title(),
                record.published(),
                payload,
                run_id,
                now,
            ],
        )?;
        Ok(())
    }

    fn get_record(&self, url: &str) -> StorageResult<Option<StoredRecord>> {
        let raw = self
            .conn
            .query_row(
                &format!("SELECT {} FROM records WHERE url = ?1", RECORD_COLUMNS),
                params![url],
                RawRecord::from_row,
            )
            .optional()?;

        raw.map(RawRecord::decode).transpose()
    }

    fn list_records(&self, kind: Option<PageKind>) -> StorageResult<Vec<StoredRecord>> {
        let raws = match kind {
            Some(kind) => {
                let mut stmt = self.conn.prepare(&format!(
                    "SELECT {} FROM records WHERE kind = ?1 ORDER BY url",
                    RECORD_COLUMNS
                ))?;
                let rows = stmt.query_map(params![kind.to_db_string()], RawRecord::from_row)?;
                rows.collect::<Result<Vec<_>, _>>()?
            }
            None => {
                let mut stmt = self
                    .conn
                    .prepare(&format!("SELECT {} FROM records ORDER BY url", RECORD_COLUMNS))?;
                let rows = stmt.query_map([], RawRecord::from_row)?;
                rows.collect::<Result<Vec<_>, _>>()?
            }
        };

        raws.into_iter().map(RawRecord::decode).collect()
    }

    fn count_records(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM records", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn count_records_by_kind(&self) -> StorageResult<HashMap<PageKind, u64>> {
        let mut stmt = self
            .conn
            .prepare("SELECT kind, COUNT(*) FROM records GROUP BY kind")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;

        let mut counts = HashMap::new();
        for row in rows {
            let (kind, count) = row?;
            match PageKind::from_db_string(&kind) {
                Some(kind) => {
                    counts.insert(kind, count as u64);
                }
                None => tracing::warn!("Ignoring records of unknown kind {}", kind),
            }
        }
        Ok(counts)
    }

    // ===== Skips =====

    fn record_skip(&mut self, run_id: i64, skip: &Skip) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO skipped_links (url, referrer, reason, run_id, recorded_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![skip.url, skip.referrer, skip.reason.to_db_string(), run_id, now],
        )?;
        Ok(())
    }

    fn count_skips_by_reason(&self) -> StorageResult<HashMap<SkipReason, u64>> {
        let mut stmt = self
            .conn
            .prepare("SELECT reason, COUNT(*) FROM skipped_links GROUP BY reason")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;

        let mut counts = HashMap::new();
        for row in rows {
            let (reason, count) = row?;
            if let Some(reason) = SkipReason::from_db_string(&reason) {
                counts.insert(reason, count as u64);
            }
        }
        Ok(counts)
    }
}
