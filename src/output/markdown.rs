//! Markdown run report
//!
//! This module renders a [`RunReport`] as a human-readable markdown file,
//! including per-category statistics and the categories that were skipped.

use crate::output::stats::RunReport;
use crate::output::{OutputError, OutputResult};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes the markdown report to `output_path`
pub fn write_markdown_report(report: &RunReport, output_path: &Path) -> OutputResult<()> {
    let markdown = format_markdown_report(report);
    let to_error = |source| OutputError::Write {
        path: output_path.display().to_string(),
        source,
    };

    let mut file = File::create(output_path).map_err(to_error)?;
    file.write_all(markdown.as_bytes()).map_err(to_error)?;

    Ok(())
}

/// Formats a run report as markdown
pub fn format_markdown_report(report: &RunReport) -> String {
    let mut md = String::new();

    md.push_str("# Provider Harvest Report\n\n");

    // Run metadata
    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Started**: {}\n", report.started_at.to_rfc3339()));
    if let Some(finished) = report.finished_at {
        md.push_str(&format!("- **Finished**: {}\n", finished.to_rfc3339()));
    }
    if let Some(duration) = report.duration_seconds() {
        md.push_str(&format!(
            "- **Duration**: {} seconds ({:.2} minutes)\n",
            duration,
            duration as f64 / 60.0
        ));
    }
    md.push_str(&format!("- **Status**: {}\n", report.status()));
    if let Some(hash) = &report.config_hash {
        md.push_str(&format!("- **Config Hash**: {}\n", hash));
    }
    md.push('\n');

    // Overall statistics
    md.push_str("## Overall Statistics\n\n");
    md.push_str(&format!(
        "- **Categories Discovered**: {}\n",
        report.categories_discovered
    ));
    md.push_str(&format!(
        "- **Categories Crawled**: {}\n",
        report.categories.len()
    ));
    md.push_str(&format!("- **Records**: {}\n", report.total_records()));
    md.push_str(&format!(
        "- **Duplicates Dropped**: {}\n",
        report.total_duplicates()
    ));
    md.push_str(&format!(
        "- **Detail Failures**: {}\n\n",
        report.total_detail_failures()
    ));

    // Per-category breakdown
    if !report.categories.is_empty() {
        md.push_str("## Categories\n\n");
        md.push_str("| Category | Pages | Records | Duplicates | Detail Failures | Skipped Fields | Stop |\n");
        md.push_str("|----------|-------|---------|------------|-----------------|----------------|------|\n");

        for c in &report.categories {
            md.push_str(&format!(
                "| {} | {} | {} | {} | {} | {} | {} |\n",
                c.name,
                c.pages_fetched,
                c.records,
                c.duplicates,
                c.detail_failures,
                c.extraction_skips,
                c.stop
            ));
        }
        md.push('\n');
    }

    let partial: Vec<_> = report.partial_categories().collect();
    if !partial.is_empty() {
        md.push_str("## Incomplete Categories\n\n");
        for c in partial {
            md.push_str(&format!("- {} ({})\n", c.name, c.stop));
        }
        md.push('\n');
    }

    if !report.skipped.is_empty() {
        md.push_str("## Skipped Categories\n\n");
        md.push_str("These categories had no listing link on the landing page.\n\n");
        for name in &report.skipped {
            md.push_str(&format!("- {}\n", name));
        }
        md.push('\n');
    }

    md
}
