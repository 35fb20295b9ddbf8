//! SQLite-backed record sink
//!
//! This module provides a sink that writes every emitted record and skip
//! straight into the export database.

use crate::output::traits::{OutputError, OutputResult, RecordSink};
use crate::spider::{Record, Skip};
use crate::storage::{RunStatus, SqliteStorage, Storage};
use crate::DrivelogError;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

/// Shared handle to a storage backend
pub type SharedStorage = Arc<Mutex<dyn Storage + Send>>;

/// SQLite-based record sink
///
/// Records are upserted by URL, so a record delivered twice simply
/// overwrites itself.
pub struct SqliteRecordSink {
    storage: SharedStorage,
    run_id: i64,
}

impl SqliteRecordSink {
    /// Creates a sink writing into an existing run
    ///
    /// # Arguments
    ///
    /// * `storage` - The storage backend to use
    /// * `run_id` - The current run ID
    pub fn new(storage: SharedStorage, run_id: i64) -> Self {
        Self { storage, run_id }
    }

    /// Opens (or creates) the database at `path` and starts a new run in it
    pub fn open(
        path: &Path,
        config_hash: &str,
        subject: Option<&str>,
    ) -> Result<Self, DrivelogError> {
        let mut storage = SqliteStorage::new(path)?;
        let run_id = storage.create_run(config_hash, subject)?;
        tracing::info!("Exporting to {} (run {})", path.display(), run_id);

        Ok(Self::new(Arc::new(Mutex::new(storage)), run_id))
    }

    pub fn run_id(&self) -> i64 {
        self.run_id
    }

    /// The storage this sink writes to
    pub fn storage(&self) -> SharedStorage {
        Arc::clone(&self.storage)
    }

    fn lock(&self) -> OutputResult<MutexGuard<'_, dyn Storage + Send + 'static>> {
        self.storage
            .lock()
            .map_err(|e| OutputError::Storage(format!("Failed to lock storage: {}", e)))
    }
}

impl RecordSink for SqliteRecordSink {
    fn emit(&self, record: &Record) -> OutputResult<()> {
        self.lock()?
            .upsert_record(self.run_id, record)
            .map_err(|e| OutputError::Storage(e.to_string()))
    }

    fn skip(&self, skip: &Skip) -> OutputResult<()> {
        self.lock()?
            .record_skip(self.run_id, skip)
            .map_err(|e| OutputError::Storage(e.to_string()))
    }

    fn finalize(&self, status: RunStatus) -> OutputResult<()> {
        self.lock()?
            .finish_run(self.run_id, status)
            .map_err(|e| OutputError::Storage(e.to_string()))?;
        tracing::info!("Run {} finished: {}", self.run_id, status.to_db_string());
        Ok(())
    }
}
