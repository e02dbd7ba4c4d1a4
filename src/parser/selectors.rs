use crate::config::SelectorConfig;
use crate::ConfigError;
use regex::Regex;
use scraper::{ElementRef, Selector};

/// Compiled form of [`SelectorConfig`]
///
/// Built once per run; parsing functions borrow it for every page.
#[derive(Debug, Clone)]
pub struct Selectors {
    pub category_label: Selector,
    pub category_panel: Selector,
    pub category_link: Selector,
    pub item_slug: Regex,
    pub provider_card: Selector,
    pub provider_name: Selector,
    pub provider_category: Selector,
    pub provider_link: Selector,
    pub location_block: Selector,
    pub location_address: Selector,
    pub phone: Selector,
    pub phone_attr: String,
}

impl Selectors {
    /// Compiles every selector and the item-slug pattern
    ///
    /// # Returns
    ///
    /// * `Ok(Selectors)` - All selectors compiled
    /// * `Err(ConfigError)` - The first selector or pattern that failed
    pub fn compile(config: &SelectorConfig) -> Result<Self, ConfigError> {
        if config.phone_attr.trim().is_empty() {
            return Err(ConfigError::Validation(
                "phone-attr cannot be empty".to_string(),
            ));
        }

        let item_slug = Regex::new(&config.item_slug_pattern).map_err(|e| {
            ConfigError::InvalidPattern(format!(
                "item-slug-pattern '{}': {}",
                config.item_slug_pattern, e
            ))
        })?;

        Ok(Self {
            category_label: parse_selector(&config.category_label)?,
            category_panel: parse_selector(&config.category_panel)?,
            category_link: parse_selector(&config.category_link)?,
            item_slug,
            provider_card: parse_selector(&config.provider_card)?,
            provider_name: parse_selector(&config.provider_name)?,
            provider_category: parse_selector(&config.provider_category)?,
            provider_link: parse_selector(&config.provider_link)?,
            location_block: parse_selector(&config.location_block)?,
            location_address: parse_selector(&config.location_address)?,
            phone: parse_selector(&config.phone)?,
            phone_attr: config.phone_attr.trim().to_string(),
        })
    }
}

fn parse_selector(selector: &str) -> Result<Selector, ConfigError> {
    Selector::parse(selector).map_err(|e| ConfigError::InvalidSelector {
        selector: selector.to_string(),
        message: e.to_string(),
    })
}

/// Collects an element's text with runs of whitespace collapsed
///
/// Returns None when the element holds no visible text.
pub(crate) fn collapsed_text(element: &ElementRef<'_>) -> Option<String> {
    let text = element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ");

    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Text of the first descendant matching `selector`
pub(crate) fn first_text(element: &ElementRef<'_>, selector: &Selector) -> Option<String> {
    element
        .select(selector)
        .next()
        .and_then(|child| collapsed_text(&child))
}
