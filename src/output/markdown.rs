//! Markdown summary generation
//!
//! This module generates a human-readable markdown summary of an export:
//! run metadata, record counts per kind, the vehicles found and how much
//! content hangs off each, and why links were skipped.

use crate::output::traits::{CrawlSummary, OutputResult};
use crate::url::PageKind;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes the markdown summary to `output_path`
pub fn generate_markdown_summary(summary: &CrawlSummary, output_path: &Path) -> OutputResult<()> {
    let markdown = format_markdown_summary(summary);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a crawl summary as markdown
pub fn format_markdown_summary(summary: &CrawlSummary) -> String {
    let mut md = String::new();

    md.push_str("# Drivelog Export Summary\n\n");

    // Run metadata
    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Run ID**: {}\n", summary.run_id));
    if let Some(subject) = &summary.subject {
        md.push_str(&format!("- **Subject**: {}\n", subject));
    }
    md.push_str(&format!("- **Started**: {}\n", summary.started_at));
    if let Some(finished) = &summary.finished_at {
        md.push_str(&format!("- **Finished**: {}\n", finished));
    }
    if let Some(duration) = summary.duration_seconds {
        md.push_str(&format!(
            "- **Duration**: {} seconds ({:.2} minutes)\n",
            duration,
            duration as f64 / 60.0
        ));
    }
    md.push_str(&format!("- **Status**: {}\n", summary.status));
    md.push_str(&format!("- **Config Hash**: {}\n\n", summary.config_hash));

    // Records
    md.push_str("## Records\n\n");
    md.push_str(&format!("Total: {}\n\n", summary.total_records));
    md.push_str("| Kind | Count |\n");
    md.push_str("|------|-------|\n");
    for kind in PageKind::ALL {
        md.push_str(&format!("| {} | {} |\n", kind, summary.count_of(kind)));
    }
    md.push('\n');

    // Vehicles
    if !summary.vehicles.is_empty() {
        md.push_str("## Vehicles\n\n");
        md.push_str("| Vehicle | URL | Owned records |\n");
        md.push_str("|---------|-----|---------------|\n");
        for vehicle in &summary.vehicles {
            md.push_str(&format!(
                "| {} | {} | {} |\n",
                vehicle.title.as_deref().unwrap_or("(untitled)"),
                vehicle.url,
                vehicle.owned_records
            ));
        }
        md.push('\n');
    }

    // Skips
    if !summary.skips_by_reason.is_empty() {
        md.push_str("## Skipped Links\n\n");
        md.push_str("| Reason | Count |\n");
        md.push_str("|--------|-------|\n");

        let mut reasons: Vec<_> = summary.skips_by_reason.iter().collect();
        reasons.sort_by(|a, b| {
            b.1.cmp(a.1)
                .then_with(|| a.0.to_db_string().cmp(b.0.to_db_string()))
        });
        for (reason, count) in reasons {
            md.push_str(&format!("| {} | {} |\n", reason, count));
        }
        md.push('\n');
    }

    md
}
