//! Crawler coordinator - main harvest orchestration logic
//!
//! This module contains the run loop that coordinates all aspects of a
//! harvest, including:
//! - Fetching the landing page and discovering categories
//! - Paginating each category listing on the coordinating path
//! - Enriching each category's providers through the worker pool
//! - Handling cancellation
//! - Building the dataset and the run report

use crate::config::Config;
use crate::crawler::enrichment::enrich_category;
use crate::crawler::fetcher::{HttpFetcher, PageSource};
use crate::crawler::pagination::{crawl_listing, PaginationOptions, PaginationOutcome};
use crate::crawler::scheduler::{Throttle, WorkerPool};
use crate::model::Category;
use crate::output::{write_markdown_report, write_output, CategoryReport, CrawlResult, RunReport};
use crate::parser::{discover_categories, Selectors};
use crate::url::UrlNormalizer;
use crate::Result;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;

/// The dataset and report produced by one run
#[derive(Debug, Clone)]
pub struct CrawlOutcome {
    pub result: CrawlResult,
    pub report: RunReport,
}

/// Main harvest coordinator
pub struct Coordinator<S: PageSource = HttpFetcher> {
    config: Arc<Config>,
    source: S,
    selectors: Selectors,
    normalizer: UrlNormalizer,
    root: Url,
    throttle: Throttle,
    cancel: CancellationToken,
    config_hash: Option<String>,
}

impl Coordinator<HttpFetcher> {
    /// Creates a coordinator that fetches over HTTP
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(HarvestError)` - The HTTP client, a selector, or the root URL
    ///   could not be built
    pub fn new(config: Config) -> Result<Self> {
        let source = HttpFetcher::new(&config.http, &config.crawler)?;
        Self::with_source(config, source)
    }
}

impl<S: PageSource> Coordinator<S> {
    /// Creates a coordinator over any page source
    pub fn with_source(config: Config, source: S) -> Result<Self> {
        let selectors = Selectors::compile(&config.selectors)?;
        let root = Url::parse(&config.site.root_url)?;
        let normalizer = UrlNormalizer::new(config.site.volatile_params.clone());
        let throttle = Throttle::new(Duration::from_millis(config.crawler.request_delay_ms));

        Ok(Self {
            config: Arc::new(config),
            source,
            selectors,
            normalizer,
            root,
            throttle,
            cancel: CancellationToken::new(),
            config_hash: None,
        })
    }

    /// Replaces the cancellation token
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Records the config hash in the run report
    pub fn with_config_hash(mut self, hash: Option<String>) -> Self {
        self.config_hash = hash;
        self
    }

    /// Fetches the landing page and discovers the categories
    ///
    /// A failed landing fetch or a structural mismatch is fatal. Returns an
    /// empty list if the run is cancelled before the fetch starts.
    pub async fn discover(&mut self) -> Result<Vec<Category>> {
        if !self.throttle.ready(&self.cancel).await {
            return Ok(Vec::new());
        }

        tracing::info!("Fetching landing page {}", self.root);
        let body = self.source.fetch(self.root.as_str(), &self.cancel).await?;

        let categories = discover_categories(
            &body,
            &self.root,
            &self.selectors,
            &self.config.site.page_param,
        )?;
        tracing::info!("Discovered {} categories", categories.len());

        Ok(categories)
    }

    /// Runs a full harvest
    ///
    /// Categories are crawled one at a time, in discovery order. After
    /// cancellation the categories gathered so far are returned, with the
    /// interrupted one included.
    pub async fn run(&mut self) -> Result<CrawlOutcome> {
        let mut report = RunReport::new(self.config_hash.clone());
        let mut result = CrawlResult::new();

        let categories = self.discover().await?;
        report.categories_discovered = categories.len();

        let options = PaginationOptions {
            page_size: self.config.crawler.page_size,
            page_param: self.config.site.page_param.clone(),
            record_ceiling: self.config.crawler.record_ceiling,
            max_pages: self.config.crawler.max_pages,
        };
        let pool = WorkerPool::new(
            self.config.crawler.worker_pool_size as usize,
            Duration::from_millis(self.config.crawler.request_delay_ms),
        );
        let total = categories.len();

        for (index, category) in categories.into_iter().enumerate() {
            if self.cancel.is_cancelled() {
                break;
            }

            let Some(listing) = category.listing_url.as_ref() else {
                tracing::warn!("Skipping category '{}': no listing link", category.name);
                report.skipped.push(category.name);
                continue;
            };

            tracing::info!(
                "Crawling category '{}' ({}/{})",
                category.name,
                index + 1,
                total
            );

            let PaginationOutcome {
                summaries,
                pages_fetched,
                skips,
                stop,
            } = crawl_listing(
                &self.source,
                listing,
                &self.root,
                &self.selectors,
                &options,
                &mut self.throttle,
                &self.cancel,
            )
            .await;

            let summary_count = summaries.len();
            let enrichment = enrich_category(
                &self.source,
                summaries,
                &self.normalizer,
                &self.selectors,
                &pool,
                &self.cancel,
            )
            .await;

            let category_report = CategoryReport {
                name: category.name.clone(),
                pages_fetched,
                summaries: summary_count,
                records: enrichment.records.len(),
                duplicates: enrichment.duplicates,
                detail_failures: enrichment.failures.len(),
                unenriched: enrichment.unenriched,
                extraction_skips: skips.len() + enrichment.skips.len(),
                stop,
            };
            tracing::info!(
                "Category '{}': {} records, {} duplicates, {} detail failures",
                category_report.name,
                category_report.records,
                category_report.duplicates,
                category_report.detail_failures
            );

            report.categories.push(category_report);
            result.insert(category.name, enrichment.records);
        }

        if self.cancel.is_cancelled() {
            tracing::warn!("Run cancelled after {} categories", result.len());
            report.cancelled = true;
        }

        report.finish();
        Ok(CrawlOutcome { result, report })
    }
}

/// Runs a harvest over HTTP and writes its output files
///
/// The dataset goes to `output.output-path`; the markdown report is written
/// only when `output.summary-path` is set.
pub async fn run_crawl(
    config: Config,
    config_hash: Option<String>,
    cancel: CancellationToken,
) -> Result<CrawlOutcome> {
    let output_path = config.output.output_path.clone();
    let summary_path = config.output.summary_path.clone();

    let mut coordinator = Coordinator::new(config)?
        .with_cancellation(cancel)
        .with_config_hash(config_hash);
    let outcome = coordinator.run().await?;

    write_output(&outcome.result, Path::new(&output_path))?;
    if let Some(path) = summary_path {
        write_markdown_report(&outcome.report, Path::new(&path))?;
        tracing::info!("Wrote run report to {}", path);
    }

    Ok(outcome)
}
