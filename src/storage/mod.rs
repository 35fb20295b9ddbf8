//! Storage module for persisting crawl output
//!
//! This module handles all database operations for the exporter, including:
//! - SQLite database initialization and schema management
//! - Run tracking
//! - Record upserts keyed by URL
//! - Skipped link bookkeeping

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{Storage, StorageError, StorageResult};

use crate::spider::Record;
use crate::url::PageKind;
use crate::DrivelogError;

use std::path::Path;

/// Initializes or opens a storage database
pub fn open_storage(path: &Path) -> Result<SqliteStorage, DrivelogError> {
    SqliteStorage::new(path)
}

/// A record as it sits in the database
#[derive(Debug, Clone)]
pub struct StoredRecord {
    pub url: String,
    pub kind: PageKind,
    pub parent: Option<String>,
    pub origin: Option<String>,
    pub title: Option<String>,
    pub published: Option<String>,
    pub run_id: i64,
    pub emitted_at: String,
    /// The full record, decoded from its JSON payload
    pub record: Record,
}

/// Represents a crawl run
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: i64,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub config_hash: String,
    pub subject: Option<String>,
    pub status: RunStatus,
}

/// Status of a crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Completed,
    Interrupted,
    Failed,
}

impl RunStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Interrupted => "interrupted",
            Self::Failed => "failed",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "interrupted" => Some(Self::Interrupted),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.to_db_string())
    }
}
