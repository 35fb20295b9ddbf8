//! In-memory record sink
//!
//! Collects everything the crawler emits into vectors, for dry runs and
//! for tests that want to inspect a crawl without a database.

use crate::output::traits::{OutputError, OutputResult, RecordSink};
use crate::spider::{Record, Skip};
use crate::storage::RunStatus;
use std::sync::{Arc, Mutex};

/// A cloneable sink whose clones share the same buffers
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    records: Arc<Mutex<Vec<Record>>>,
    skips: Arc<Mutex<Vec<Skip>>>,
    status: Arc<Mutex<Option<RunStatus>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every record emitted so far, in emission order
    pub fn records(&self) -> OutputResult<Vec<Record>> {
        Ok(lock(&self.records)?.clone())
    }

    pub fn skips(&self) -> OutputResult<Vec<Skip>> {
        Ok(lock(&self.skips)?.clone())
    }

    /// The status passed to `finalize`, if it has been called
    pub fn status(&self) -> OutputResult<Option<RunStatus>> {
        Ok(*lock(&self.status)?)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> OutputResult<std::sync::MutexGuard<'_, T>> {
    mutex
        .lock()
        .map_err(|e| OutputError::Write(format!("Memory sink poisoned: {}", e)))
}

impl RecordSink for MemorySink {
    fn emit(&self, record: &Record) -> OutputResult<()> {
        lock(&self.records)?.push(record.clone());
        Ok(())
    }

    fn skip(&self, skip: &Skip) -> OutputResult<()> {
        lock(&self.skips)?.push(skip.clone());
        Ok(())
    }

    fn finalize(&self, status: RunStatus) -> OutputResult<()> {
        *lock(&self.status)? = Some(status);
        Ok(())
    }
}
