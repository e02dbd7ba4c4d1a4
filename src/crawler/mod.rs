//! Crawler module for the harvest pipeline
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with retry logic
//! - Request spacing and the detail worker pool
//! - Offset pagination over category listings
//! - Detail enrichment and per-category deduplication
//! - Overall crawl coordination

mod coordinator;
mod enrichment;
mod fetcher;
mod pagination;
mod retry;
mod scheduler;

pub use coordinator::{run_crawl, Coordinator, CrawlOutcome};
pub use enrichment::{dedup_summaries, enrich_category, EnrichmentOutcome};
pub use fetcher::{build_http_client, HttpFetcher, PageSource};
pub use pagination::{crawl_listing, PaginationOptions, PaginationOutcome, StopReason};
pub use scheduler::{Throttle, WorkerPool};
