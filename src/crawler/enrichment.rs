//! Detail-page enrichment for one category
//!
//! Summaries are deduplicated by normalized detail URL, then fetched through
//! the worker pool. Results are re-associated by index, so the output keeps
//! listing order no matter which fetch finishes first.

use crate::crawler::fetcher::PageSource;
use crate::crawler::scheduler::WorkerPool;
use crate::model::{ExtractionSkip, ProviderDetail, ProviderRecord, ProviderSummary};
use crate::parser::{parse_detail, DetailPage, Selectors};
use crate::url::UrlNormalizer;
use crate::FetchError;
use std::collections::HashSet;
use tokio_util::sync::CancellationToken;

/// Result of enriching one category
#[derive(Debug, Clone, Default)]
pub struct EnrichmentOutcome {
    /// One record per distinct detail URL, in first-seen order
    pub records: Vec<ProviderRecord>,
    /// Summaries dropped because their detail URL was already seen
    pub duplicates: usize,
    /// Detail fetches that failed; those records carry empty detail data
    pub failures: Vec<FetchError>,
    /// Records never enriched because the run was cancelled
    pub unenriched: usize,
    pub skips: Vec<ExtractionSkip>,
}

/// Drops summaries whose normalized detail URL was already seen
///
/// The surviving summaries carry the normalized URL. Returns the unique
/// summaries and the number of duplicates removed.
pub fn dedup_summaries(
    summaries: Vec<ProviderSummary>,
    normalizer: &UrlNormalizer,
) -> (Vec<ProviderSummary>, usize) {
    let mut seen = HashSet::new();
    let mut unique = Vec::with_capacity(summaries.len());
    let mut duplicates = 0;

    for mut summary in summaries {
        let key = normalizer.dedup_key(&summary.detail_url);
        if seen.insert(key.clone()) {
            summary.detail_url = key;
            unique.push(summary);
        } else {
            tracing::debug!("Duplicate provider {} ({})", summary.name, key);
            duplicates += 1;
        }
    }

    (unique, duplicates)
}

/// Enriches a category's summaries with detail-page data
///
/// A failed detail fetch degrades that one record to empty addresses and
/// phones; it is counted in [`EnrichmentOutcome::failures`] and never drops
/// the summary.
pub async fn enrich_category<S: PageSource + ?Sized>(
    source: &S,
    summaries: Vec<ProviderSummary>,
    normalizer: &UrlNormalizer,
    selectors: &Selectors,
    pool: &WorkerPool,
    cancel: &CancellationToken,
) -> EnrichmentOutcome {
    let (unique, duplicates) = dedup_summaries(summaries, normalizer);
    let urls: Vec<String> = unique.iter().map(|s| s.detail_url.clone()).collect();

    let fetched = pool
        .run(urls, cancel, |url| async move {
            source
                .fetch(&url, cancel)
                .await
                .map(|body| parse_detail(&body, selectors))
        })
        .await;

    let mut outcome = EnrichmentOutcome {
        duplicates,
        ..EnrichmentOutcome::default()
    };

    for (summary, result) in unique.into_iter().zip(fetched) {
        let detail = match result {
            Some(Ok(DetailPage { detail, skips })) => {
                for skip in &skips {
                    tracing::debug!("{}: skipped {}", summary.detail_url, skip);
                }
                outcome.skips.extend(skips);
                detail
            }
            Some(Err(e)) => {
                tracing::warn!(
                    "Detail fetch failed for {} ({}): {}",
                    summary.name,
                    e.url(),
                    e
                );
                outcome.failures.push(e);
                ProviderDetail::default()
            }
            None => {
                outcome.unenriched += 1;
                ProviderDetail::default()
            }
        };
        outcome.records.push(ProviderRecord::merge(summary, detail));
    }

    outcome
}
