//! Category discovery from the site's landing page
//!
//! The landing page renders categories as a tab strip: N labels and N content
//! panels, paired by position. Each panel lists links into that category; the
//! first one is reduced to the category's listing root.

use crate::model::{Category, NOT_AVAILABLE};
use crate::parser::selectors::{collapsed_text, Selectors};
use crate::url::{category_root, resolve_link};
use crate::DiscoveryError;
use scraper::Html;
use std::collections::HashSet;
use url::Url;

/// Discovers categories from the landing page
///
/// # Returns
///
/// * `Ok(Vec<Category>)` - Categories in page order; duplicates by name removed
/// * `Err(DiscoveryError::StructureMismatch)` - Label and panel counts differ
/// * `Err(DiscoveryError::NoCategories)` - The page has no category labels
pub fn discover_categories(
    html: &str,
    base: &Url,
    selectors: &Selectors,
    page_param: &str,
) -> Result<Vec<Category>, DiscoveryError> {
    let document = Html::parse_document(html);

    let labels: Vec<String> = document
        .select(&selectors.category_label)
        .map(|label| collapsed_text(&label).unwrap_or_else(|| NOT_AVAILABLE.to_string()))
        .collect();
    let panels: Vec<_> = document.select(&selectors.category_panel).collect();

    if labels.len() != panels.len() {
        return Err(DiscoveryError::StructureMismatch {
            labels: labels.len(),
            panels: panels.len(),
        });
    }

    if labels.is_empty() {
        return Err(DiscoveryError::NoCategories);
    }

    let mut seen = HashSet::new();
    let mut categories = Vec::with_capacity(labels.len());

    for (name, panel) in labels.into_iter().zip(panels) {
        if !seen.insert(name.clone()) {
            tracing::warn!("Duplicate category '{}' on landing page, keeping the first", name);
            continue;
        }

        let listing_url = panel
            .select(&selectors.category_link)
            .filter_map(|link| link.value().attr("href"))
            .find_map(|href| resolve_link(href, base))
            .map(|link| category_root(&link, &selectors.item_slug, page_param));

        if listing_url.is_none() {
            tracing::warn!("Category '{}' has no listing links", name);
        }

        categories.push(Category::new(name, listing_url));
    }

    Ok(categories)
}
