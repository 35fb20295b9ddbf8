//! Statistics generation from the export database
//!
//! This module provides functionality for extracting and displaying
//! crawl statistics from the storage layer.

use crate::spider::SkipReason;
use crate::storage::Storage;
use crate::url::PageKind;
use crate::DrivelogError;
use std::collections::HashMap;

/// Crawl statistics summary
#[derive(Debug, Clone)]
pub struct CrawlStatistics {
    /// Total number of exported records
    pub total_records: u64,

    /// Count of records by kind
    pub records_by_kind: HashMap<PageKind, u64>,

    /// Count of skipped links by reason
    pub skips_by_reason: HashMap<SkipReason, u64>,
}

/// Loads statistics from storage
pub fn load_statistics(storage: &dyn Storage) -> Result<CrawlStatistics, DrivelogError> {
    Ok(CrawlStatistics {
        total_records: storage.count_records()?,
        records_by_kind: storage.count_records_by_kind()?,
        skips_by_reason: storage.count_skips_by_reason()?,
    })
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Export Statistics ===\n");

    println!("Records: {}", stats.total_records);
    for kind in PageKind::ALL {
        let count = stats.records_by_kind.get(&kind).copied().unwrap_or(0);
        let percentage = if stats.total_records > 0 {
            (count as f64 / stats.total_records as f64) * 100.0
        } else {
            0.0
        };
        println!("  {}: {} ({:.1}%)", kind, count, percentage);
    }
    println!();

    if !stats.skips_by_reason.is_empty() {
        println!("Skipped:");
        let mut skip_counts: Vec<_> = stats.skips_by_reason.iter().collect();
        skip_counts.sort_by(|a, b| b.1.cmp(a.1));

        for (reason, count) in skip_counts {
            println!("  {}: {}", reason, count);
        }
        println!();
    }

    let suspicious = stats
        .skips_by_reason
        .get(&SkipReason::OwnershipMismatch)
        .copied()
        .unwrap_or(0);
    if suspicious > 0 {
        println!(
            "{} photo post(s) by other authors were skipped; see the drivelog::suspicious log",
            suspicious
        );
    }
}
