//! URL handling module for Provider-Harvest
//!
//! This module provides the detail-URL normalizer used as the dedup key, and
//! the helpers that turn panel links into category roots and category roots
//! into offset-paginated listing URLs.

mod listing;
mod normalize;

pub use listing::{category_root, page_url, resolve_link};
pub use normalize::UrlNormalizer;
