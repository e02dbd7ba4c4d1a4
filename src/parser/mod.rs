//! HTML parsers for the three page structures of a directory site
//!
//! - The landing page, holding the category tab strip
//! - Listing pages, holding provider summary cards
//! - Detail pages, holding one provider's locations and phone numbers
//!
//! Parsers never fail on a single unreadable field. They report it as an
//! [`ExtractionSkip`](crate::model::ExtractionSkip) and carry on. Only the
//! landing page has a structural invariant whose violation is an error.

mod detail;
mod discovery;
mod listing;
mod selectors;

pub use detail::{parse_detail, DetailPage};
pub use discovery::discover_categories;
pub use listing::{parse_listing, ListingPage};
pub use selectors::Selectors;
