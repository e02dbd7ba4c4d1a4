//! Provider detail page parser

use crate::model::{ExtractionSkip, Field, ProviderDetail, NOT_AVAILABLE};
use crate::parser::selectors::Selectors;
use scraper::{ElementRef, Html};

/// Everything extracted from one detail page
#[derive(Debug, Clone, Default)]
pub struct DetailPage {
    pub detail: ProviderDetail,
    pub skips: Vec<ExtractionSkip>,
}

/// Parses a provider detail page
///
/// # Extraction Rules
///
/// **Addresses:** one entry per location block, in page order. A block with
/// no address text contributes "N/A" so the count always matches the number
/// of blocks.
///
/// **Phones:** read from the configured attribute (a `tel:` prefix is
/// stripped), never from display text. No phone elements means an empty
/// list; an element whose attribute is empty contributes "N/A". Repeated
/// numbers are kept once, in first-seen order.
pub fn parse_detail(html: &str, selectors: &Selectors) -> DetailPage {
    let document = Html::parse_document(html);
    let mut page = DetailPage::default();

    for (position, block) in document.select(&selectors.location_block).enumerate() {
        match block_address(&block, selectors) {
            Some(address) => page.detail.addresses.push(address),
            None => {
                page.skips.push(ExtractionSkip::new(
                    Field::Address,
                    position,
                    "location block has no address",
                ));
                page.detail.addresses.push(NOT_AVAILABLE.to_string());
            }
        }
    }

    for (position, element) in document.select(&selectors.phone).enumerate() {
        let number = element
            .value()
            .attr(&selectors.phone_attr)
            .map(clean_phone)
            .filter(|n| !n.is_empty());

        let number = match number {
            Some(n) => n,
            None => {
                page.skips.push(ExtractionSkip::new(
                    Field::Phone,
                    position,
                    format!("empty '{}' attribute", selectors.phone_attr),
                ));
                NOT_AVAILABLE.to_string()
            }
        };

        if !page.detail.phones.contains(&number) {
            page.detail.phones.push(number);
        }
    }

    page
}

/// Formatting tags whose text continues the current address line
const INLINE_TAGS: &[&str] = &[
    "a", "abbr", "b", "bdi", "em", "font", "i", "mark", "small", "strong", "sub", "sup", "u",
];

/// Joins the lines of a block's address element with `", "`
///
/// A line ends at `<br>` and around any child element that is not inline
/// formatting. Whitespace is collapsed within each line.
fn block_address(block: &ElementRef<'_>, selectors: &Selectors) -> Option<String> {
    let address = block.select(&selectors.location_address).next()?;

    let mut lines = vec![String::new()];
    collect_lines(address, &mut lines);

    let parts: Vec<String> = lines
        .iter()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(", "))
    }
}

fn collect_lines(element: ElementRef<'_>, lines: &mut Vec<String>) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            if let Some(line) = lines.last_mut() {
                line.push_str(text);
            }
        } else if let Some(child) = ElementRef::wrap(child) {
            let tag = child.value().name();
            if INLINE_TAGS.contains(&tag) {
                collect_lines(child, lines);
            } else {
                lines.push(String::new());
                if tag != "br" {
                    collect_lines(child, lines);
                    lines.push(String::new());
                }
            }
        }
    }
}

fn clean_phone(raw: &str) -> String {
    let raw = raw.trim();
    raw.strip_prefix("tel:").unwrap_or(raw).trim().to_string()
}
