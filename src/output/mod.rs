//! Output module: record sinks, statistics and summaries
//!
//! This module handles:
//! - Exporting records through a [`RecordSink`] (SQLite or in-memory)
//! - Loading and printing statistics from an export database
//! - Generating markdown summaries of an export

mod markdown;
mod memory;
mod sqlite_output;
pub mod stats;
mod traits;

pub use markdown::{format_markdown_summary, generate_markdown_summary};
pub use memory::MemorySink;
pub use sqlite_output::{SharedStorage, SqliteRecordSink};
pub use stats::{load_statistics, print_statistics, CrawlStatistics};
pub use traits::{CrawlSummary, OutputError, OutputResult, RecordSink, VehicleSummary};

use crate::storage::Storage;
use crate::url::PageKind;
use crate::DrivelogError;
use std::collections::HashMap;

/// Generates a summary of the latest run from storage
pub fn generate_summary(storage: &dyn Storage) -> Result<CrawlSummary, DrivelogError> {
    let run = storage
        .get_latest_run()?
        .ok_or_else(|| OutputError::Storage("No crawl runs found in database".to_string()))?;

    let duration_seconds = match (
        run.started_at.parse::<chrono::DateTime<chrono::Utc>>(),
        run.finished_at
            .as_deref()
            .map(str::parse::<chrono::DateTime<chrono::Utc>>),
    ) {
        (Ok(started), Some(Ok(finished))) => Some((finished - started).num_seconds().max(0) as u64),
        _ => None,
    };

    let stats = stats::load_statistics(storage)?;

    let mut owned: HashMap<String, u64> = HashMap::new();
    for stored in storage.list_records(None)? {
        if let Some(parent) = stored.parent {
            *owned.entry(parent).or_default() += 1;
        }
    }

    let vehicles = storage
        .list_records(Some(PageKind::Vehicle))?
        .into_iter()
        .map(|stored| VehicleSummary {
            owned_records: owned.get(&stored.url).copied().unwrap_or(0),
            url: stored.url,
            title: stored.title,
        })
        .collect();

    Ok(CrawlSummary {
        run_id: run.id,
        started_at: run.started_at,
        finished_at: run.finished_at,
        duration_seconds,
        status: run.status.to_db_string().to_string(),
        config_hash: run.config_hash,
        subject: run.subject,
        total_records: stats.total_records,
        records_by_kind: stats.records_by_kind,
        skips_by_reason: stats.skips_by_reason,
        vehicles,
    })
}
