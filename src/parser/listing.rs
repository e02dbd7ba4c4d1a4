//! Listing page parser
//!
//! Extracts provider summary cards from one page of a category listing.

use crate::model::{ExtractionSkip, Field, ProviderSummary, NOT_AVAILABLE};
use crate::parser::selectors::{first_text, Selectors};
use crate::url::resolve_link;
use scraper::{ElementRef, Html};
use url::Url;

/// Everything extracted from one listing page
#[derive(Debug, Clone, Default)]
pub struct ListingPage {
    /// Number of cards the page contained, including dropped ones
    ///
    /// Zero is the pagination terminal signal.
    pub cards_seen: usize,

    /// Summaries in card order
    pub summaries: Vec<ProviderSummary>,

    /// Fields replaced by "N/A" and cards dropped for lack of a detail link
    pub skips: Vec<ExtractionSkip>,
}

impl ListingPage {
    /// Returns true if the page had no cards at all
    pub fn is_empty(&self) -> bool {
        self.cards_seen == 0
    }
}

/// Parses a listing page
///
/// # Extraction Rules
///
/// - Name and category label fall back to "N/A" when missing; the card is kept
/// - The detail link is resolved against `base`; a card without a usable
///   link is dropped
///
/// # Arguments
///
/// * `html` - The listing page body
/// * `base` - Site root used to resolve relative links
/// * `selectors` - Compiled site selectors
pub fn parse_listing(html: &str, base: &Url, selectors: &Selectors) -> ListingPage {
    let document = Html::parse_document(html);
    let mut page = ListingPage::default();

    for (position, card) in document.select(&selectors.provider_card).enumerate() {
        page.cards_seen += 1;
        match parse_card(&card, position, base, selectors, &mut page.skips) {
            Some(summary) => page.summaries.push(summary),
            None => {
                tracing::debug!("Dropped listing card #{} without a detail link", position);
            }
        }
    }

    page
}

fn parse_card(
    card: &ElementRef<'_>,
    position: usize,
    base: &Url,
    selectors: &Selectors,
    skips: &mut Vec<ExtractionSkip>,
) -> Option<ProviderSummary> {
    let detail_url = match card
        .select(&selectors.provider_link)
        .next()
        .and_then(|link| link.value().attr("href"))
    {
        Some(href) => match resolve_link(href, base) {
            Some(url) => url.to_string(),
            None => {
                skips.push(ExtractionSkip::new(
                    Field::DetailUrl,
                    position,
                    format!("unusable detail link '{}'", href),
                ));
                return None;
            }
        },
        None => {
            skips.push(ExtractionSkip::new(
                Field::DetailUrl,
                position,
                "card has no detail link",
            ));
            return None;
        }
    };

    let name = first_text(card, &selectors.provider_name).unwrap_or_else(|| {
        skips.push(ExtractionSkip::new(Field::Name, position, "missing name"));
        NOT_AVAILABLE.to_string()
    });

    let category_label = first_text(card, &selectors.provider_category).unwrap_or_else(|| {
        skips.push(ExtractionSkip::new(
            Field::CategoryLabel,
            position,
            "missing category label",
        ));
        NOT_AVAILABLE.to_string()
    });

    Some(ProviderSummary {
        name,
        category_label,
        detail_url,
    })
}
