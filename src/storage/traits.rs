//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::spider::{Record, Skip, SkipReason};
use crate::storage::{RunRecord, RunStatus, StoredRecord};
use crate::url::PageKind;
use std::collections::HashMap;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// This trait defines every database operation the exporter and the
/// statistics views need.
pub trait Storage {
    // ===== Run Management =====

    /// Creates a new crawl run
    ///
    /// # Arguments
    ///
    /// * `config_hash` - Hash of the configuration file
    /// * `subject` - The username the run is scoped to, if any
    ///
    /// # Returns
    ///
    /// The ID of the newly created run
    fn create_run(&mut self, config_hash: &str, subject: Option<&str>) -> StorageResult<i64>;

    /// Gets a run by ID
    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord>;

    /// Gets the most recent run
    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>>;

    /// Sets the final status of a run and stamps its finish time
    fn finish_run(&mut self, run_id: i64, status: RunStatus) -> StorageResult<()>;

    // ===== Records =====

    /// Inserts a record, replacing any earlier record with the same URL
    ///
    /// A record that knows its owning vehicle is never replaced by one that
    /// does not.
    fn upsert_record(&mut self, run_id: i64, record: &Record) -> StorageResult<()>;

    /// Gets the record stored for a URL
    fn get_record(&self, url: &str) -> StorageResult<Option<StoredRecord>>;

    /// Lists records, optionally only those of one kind, ordered by URL
    fn list_records(&self, kind: Option<PageKind>) -> StorageResult<Vec<StoredRecord>>;

    /// Gets total record count
    fn count_records(&self) -> StorageResult<u64>;

    /// Counts records per kind
    fn count_records_by_kind(&self) -> StorageResult<HashMap<PageKind, u64>>;

    // ===== Skips =====

    /// Records a link or page that produced nothing
    fn record_skip(&mut self, run_id: i64, skip: &Skip) -> StorageResult<()>;

    /// Counts skips per reason
    fn count_skips_by_reason(&self) -> StorageResult<HashMap<SkipReason, u64>>;
}
