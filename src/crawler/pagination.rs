//! Offset-driven pagination over one category listing
//!
//! The source's declared total is unreliable, so an empty page is the only
//! real end-of-listing signal. The record ceiling and page limit exist only
//! to stop a runaway loop.

use crate::crawler::fetcher::PageSource;
use crate::crawler::scheduler::Throttle;
use crate::model::{ExtractionSkip, ProviderSummary};
use crate::parser::{parse_listing, Selectors};
use crate::url::page_url;
use crate::FetchError;
use std::fmt;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Pagination limits for one category
#[derive(Debug, Clone)]
pub struct PaginationOptions {
    pub page_size: u32,
    pub page_param: String,
    pub record_ceiling: Option<u32>,
    pub max_pages: u32,
}

/// Why pagination of a category stopped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// A page with no cards was served
    EmptyPage,
    /// A listing page could not be fetched; earlier pages are kept
    FetchFailed(FetchError),
    /// The offset reached the configured record ceiling
    RecordCeiling,
    /// The page limit was reached without seeing an empty page
    PageLimit,
    /// The run was cancelled
    Cancelled,
}

impl StopReason {
    /// Returns true if the listing ended normally
    pub fn is_complete(&self) -> bool {
        matches!(self, StopReason::EmptyPage | StopReason::RecordCeiling)
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::EmptyPage => f.write_str("end of listing"),
            StopReason::FetchFailed(e) => write!(f, "listing fetch failed ({})", e),
            StopReason::RecordCeiling => f.write_str("record ceiling reached"),
            StopReason::PageLimit => f.write_str("page limit reached"),
            StopReason::Cancelled => f.write_str("cancelled"),
        }
    }
}

/// Result of paginating one category
#[derive(Debug, Clone)]
pub struct PaginationOutcome {
    /// Summaries in page and card order
    pub summaries: Vec<ProviderSummary>,
    /// Listing pages successfully fetched, including the final empty one
    pub pages_fetched: u32,
    pub skips: Vec<ExtractionSkip>,
    pub stop: StopReason,
}

/// Walks a category listing from offset 0 until a terminal condition
///
/// # State Machine
///
/// | Condition | Transition |
/// |-----------|------------|
/// | `offset >= record_ceiling` | stop: `RecordCeiling` |
/// | `pages_fetched >= max_pages` | stop: `PageLimit` |
/// | cancelled while waiting | stop: `Cancelled` |
/// | fetch fails | stop: `FetchFailed` |
/// | page has no cards | stop: `EmptyPage` |
/// | otherwise | append summaries, `offset += page_size` |
pub async fn crawl_listing<S: PageSource + ?Sized>(
    source: &S,
    listing: &Url,
    base: &Url,
    selectors: &Selectors,
    options: &PaginationOptions,
    throttle: &mut Throttle,
    cancel: &CancellationToken,
) -> PaginationOutcome {
    let mut summaries = Vec::new();
    let mut skips = Vec::new();
    let mut pages_fetched = 0u32;
    let mut offset = 0u32;

    let stop = loop {
        if options.record_ceiling.is_some_and(|ceiling| offset >= ceiling) {
            break StopReason::RecordCeiling;
        }

        if pages_fetched >= options.max_pages {
            tracing::warn!(
                "Listing {} still serving cards after {} pages, stopping",
                listing,
                pages_fetched
            );
            break StopReason::PageLimit;
        }

        if !throttle.ready(cancel).await {
            break StopReason::Cancelled;
        }

        let url = page_url(listing, &options.page_param, offset);
        tracing::debug!("Fetching listing page at offset {}: {}", offset, url);

        let body = match source.fetch(url.as_str(), cancel).await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!("Listing fetch failed at offset {}: {}", offset, e);
                break StopReason::FetchFailed(e);
            }
        };
        pages_fetched += 1;

        let page = parse_listing(&body, base, selectors);
        for skip in &page.skips {
            tracing::debug!("Listing offset {}: skipped {}", offset, skip);
        }
        skips.extend(page.skips);

        if page.cards_seen == 0 {
            break StopReason::EmptyPage;
        }

        summaries.extend(page.summaries);
        offset = offset.saturating_add(options.page_size);
    };

    tracing::info!(
        "Listing {} done: {} summaries from {} pages ({})",
        listing,
        summaries.len(),
        pages_fetched,
        stop
    );

    PaginationOutcome {
        summaries,
        pages_fetched,
        skips,
        stop,
    }
}
