//! Data model for a harvest run
//!
//! All entities live for a single run only:
//! - [`Category`] comes out of discovery
//! - [`ProviderSummary`] comes out of a listing page
//! - [`ProviderDetail`] comes out of a detail page
//! - [`ProviderRecord`] is the merged unit written to the output

mod category;
mod provider;

pub use category::Category;
pub use provider::{
    ExtractionSkip, Field, ProviderDetail, ProviderRecord, ProviderSummary, NOT_AVAILABLE,
};
