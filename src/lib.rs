//! Provider-Harvest: a polite directory-site harvester
//!
//! This crate crawls a directory-style website that lists providers under
//! categorized, paginated listings. It discovers the categories, walks each
//! listing in fixed-size pages, enriches every provider from its detail page,
//! and aggregates the records into one dataset keyed by category.

pub mod config;
pub mod crawler;
pub mod model;
pub mod output;
pub mod parser;
pub mod url;

use thiserror::Error;

/// Main error type for Provider-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Category discovery failed: {0}")]
    Discovery(#[from] DiscoveryError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid selector '{selector}': {message}")]
    InvalidSelector { selector: String, message: String },

    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),
}

/// A failed page fetch
///
/// `Transport` covers everything below HTTP (DNS, connect, timeout, reset,
/// truncated body); `HttpStatus` is any non-2xx response.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("transport failure for {url}: {message}")]
    Transport { url: String, message: String },

    #[error("HTTP {code} for {url}")]
    HttpStatus { url: String, code: u16 },
}

impl FetchError {
    /// Returns true for failures that may succeed on a later attempt
    ///
    /// Transport failures and 5xx responses are retried; 4xx responses are not.
    pub fn is_retriable(&self) -> bool {
        match self {
            FetchError::Transport { .. } => true,
            FetchError::HttpStatus { code, .. } => (500..600).contains(code),
        }
    }

    /// The URL that failed
    pub fn url(&self) -> &str {
        match self {
            FetchError::Transport { url, .. } | FetchError::HttpStatus { url, .. } => url,
        }
    }
}

/// Landing-page structure errors; fatal for the whole run
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DiscoveryError {
    #[error("structure mismatch: {labels} category labels but {panels} content panels")]
    StructureMismatch { labels: usize, panels: usize },

    #[error("no categories found on the landing page")]
    NoCategories,
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for Provider-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{run_crawl, Coordinator, CrawlOutcome};
pub use model::{Category, ProviderDetail, ProviderRecord, ProviderSummary};
pub use output::CrawlResult;
pub use url::UrlNormalizer;
