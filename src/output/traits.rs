//! Output sink traits and summary types
//!
//! This module defines the trait the crawler hands its records to, and the
//! data structure crawl summaries are rendered from.

use crate::spider::{Record, Skip, SkipReason};
use crate::storage::RunStatus;
use crate::url::PageKind;
use std::collections::HashMap;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write output: {0}")]
    Write(String),

    #[error("Failed to format output: {0}")]
    Format(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage error: {0}")]
    Storage(String),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// A vehicle and how many exported records it owns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VehicleSummary {
    pub url: String,
    pub title: Option<String>,
    /// Records whose parent is this vehicle
    pub owned_records: u64,
}

/// Summary of one export database
#[derive(Debug, Clone, Default)]
pub struct CrawlSummary {
    // Run metadata
    pub run_id: i64,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub duration_seconds: Option<u64>,
    pub status: String,
    pub config_hash: String,
    pub subject: Option<String>,

    pub total_records: u64,
    pub records_by_kind: HashMap<PageKind, u64>,
    pub skips_by_reason: HashMap<SkipReason, u64>,
    pub vehicles: Vec<VehicleSummary>,
}

impl CrawlSummary {
    /// Creates a new empty crawl summary
    pub fn new() -> Self {
        Self::default()
    }

    /// Records of one kind
    pub fn count_of(&self, kind: PageKind) -> u64 {
        self.records_by_kind.get(&kind).copied().unwrap_or(0)
    }

    /// Total number of skipped links and pages
    pub fn total_skips(&self) -> u64 {
        self.skips_by_reason.values().sum()
    }
}

/// Where the crawler sends what it extracts
///
/// Sinks are called from the coordinator task only, one call at a time.
/// Implementations must tolerate the same record URL arriving more than
/// once. The latest delivery wins, except that a record with a parent is
/// not displaced by a parentless one.
pub trait RecordSink {
    /// Exports one record
    fn emit(&self, record: &Record) -> OutputResult<()>;

    /// Notes a link or page that produced nothing
    fn skip(&self, skip: &Skip) -> OutputResult<()>;

    /// Closes the run with its final status
    fn finalize(&self, status: RunStatus) -> OutputResult<()>;
}
