//! Run statistics gathered by the coordinator
//!
//! This module provides the per-category counters recorded during a crawl
//! and prints them in a formatted manner once the run ends.

use crate::crawler::StopReason;
use chrono::{DateTime, Utc};

/// What happened while crawling one category
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryReport {
    pub name: String,

    /// Listing pages fetched, including the final empty one
    pub pages_fetched: u32,

    /// Summaries read from the listing before deduplication
    pub summaries: usize,

    /// Records written to the output
    pub records: usize,

    /// Summaries dropped as duplicates of an earlier detail URL
    pub duplicates: usize,

    /// Records whose detail fetch failed
    pub detail_failures: usize,

    /// Records left without detail data because the run was cancelled
    pub unenriched: usize,

    /// Fields replaced by "N/A" or cards dropped during extraction
    pub extraction_skips: usize,

    pub stop: StopReason,
}

impl CategoryReport {
    /// Returns true if the category's data is known to be incomplete
    pub fn is_partial(&self) -> bool {
        !self.stop.is_complete() || self.detail_failures > 0 || self.unenriched > 0
    }
}

/// Summary of a whole run
#[derive(Debug, Clone)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,

    /// SHA-256 of the config file the run was started with
    pub config_hash: Option<String>,

    /// Categories found on the landing page
    pub categories_discovered: usize,

    /// Crawled categories, in crawl order
    pub categories: Vec<CategoryReport>,

    /// Categories not crawled because they had no listing link
    pub skipped: Vec<String>,

    /// True if the run stopped early on cancellation
    pub cancelled: bool,
}

impl RunReport {
    /// Starts a report timestamped now
    pub fn new(config_hash: Option<String>) -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            config_hash,
            categories_discovered: 0,
            categories: Vec::new(),
            skipped: Vec::new(),
            cancelled: false,
        }
    }

    /// Stamps the finish time
    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    pub fn duration_seconds(&self) -> Option<i64> {
        self.finished_at
            .map(|finished| (finished - self.started_at).num_seconds())
    }

    pub fn total_records(&self) -> usize {
        self.categories.iter().map(|c| c.records).sum()
    }

    pub fn total_detail_failures(&self) -> usize {
        self.categories.iter().map(|c| c.detail_failures).sum()
    }

    pub fn total_duplicates(&self) -> usize {
        self.categories.iter().map(|c| c.duplicates).sum()
    }

    /// Categories whose data is known to be incomplete
    pub fn partial_categories(&self) -> impl Iterator<Item = &CategoryReport> {
        self.categories.iter().filter(|c| c.is_partial())
    }

    /// Short status word for the run
    pub fn status(&self) -> &'static str {
        if self.cancelled {
            "cancelled"
        } else if self.partial_categories().next().is_some() {
            "partial"
        } else {
            "completed"
        }
    }
}

/// Prints the run report to stdout
pub fn print_report(report: &RunReport) {
    println!("=== Harvest Report ===\n");

    println!("Overview:");
    println!("  Status: {}", report.status());
    println!("  Started: {}", report.started_at.to_rfc3339());
    if let Some(duration) = report.duration_seconds() {
        println!("  Duration: {}s", duration);
    }
    println!("  Categories discovered: {}", report.categories_discovered);
    println!("  Categories crawled: {}", report.categories.len());
    println!("  Records: {}", report.total_records());
    println!("  Duplicates dropped: {}", report.total_duplicates());
    println!("  Detail failures: {}", report.total_detail_failures());
    println!();

    println!("Categories:");
    for category in &report.categories {
        let marker = if category.is_partial() { "!" } else { "-" };
        println!(
            "  {} {}: {} records from {} pages ({})",
            marker, category.name, category.records, category.pages_fetched, category.stop
        );
        if category.detail_failures > 0 || category.unenriched > 0 {
            println!(
                "      {} detail failures, {} not enriched",
                category.detail_failures, category.unenriched
            );
        }
    }
    println!();

    if !report.skipped.is_empty() {
        println!("Skipped (no listing link) ({}):", report.skipped.len());
        for name in &report.skipped {
            println!("  - {}", name);
        }
        println!();
    }
}
