//! Output module for the harvested dataset and run reports
//!
//! This module handles:
//! - Aggregating records into the category-keyed dataset
//! - Writing the dataset as pretty-printed JSON
//! - Recording per-category crawl statistics
//! - Rendering the run report to stdout and markdown

mod json;
mod markdown;
pub mod stats;

pub use json::{to_json_string, write_output, CrawlResult};
pub use markdown::{format_markdown_report, write_markdown_report};
pub use stats::{print_report, CategoryReport, RunReport};

use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Serialized output is not UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),

    #[error("Failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;
