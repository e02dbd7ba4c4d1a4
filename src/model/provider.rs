use serde::Serialize;
use std::fmt;

/// Sentinel for a field that exists in the markup but could not be read
pub const NOT_AVAILABLE: &str = "N/A";

/// One provider card from a listing page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderSummary {
    pub name: String,

    /// Category or specialty label printed on the card
    pub category_label: String,

    /// Absolute URL of the provider's detail page
    pub detail_url: String,
}

/// Location and phone data from one provider's detail page
///
/// Empty vectors mean nothing was found on the page (or the page could not
/// be fetched), not that something was unreadable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderDetail {
    /// One entry per location block, in page order
    pub addresses: Vec<String>,

    pub phones: Vec<String>,
}

/// A summary merged with its detail data
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderRecord {
    #[serde(rename = "Provider Name")]
    pub name: String,

    #[serde(rename = "Company Name")]
    pub category_label: String,

    #[serde(rename = "Number of Locations")]
    pub location_count: usize,

    #[serde(rename = "Location Address")]
    pub addresses: Vec<String>,

    #[serde(rename = "Phone Number")]
    pub phones: Vec<String>,

    #[serde(rename = "Website Link")]
    pub detail_url: String,
}

impl ProviderRecord {
    /// Merges a summary with its detail data
    pub fn merge(summary: ProviderSummary, detail: ProviderDetail) -> Self {
        Self {
            name: summary.name,
            category_label: summary.category_label,
            location_count: detail.addresses.len(),
            addresses: detail.addresses,
            phones: detail.phones,
            detail_url: summary.detail_url,
        }
    }

    /// Returns true if no address or phone data was attached
    pub fn is_bare(&self) -> bool {
        self.addresses.is_empty() && self.phones.is_empty()
    }
}

/// Fields a parser may fail to read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    CategoryLabel,
    DetailUrl,
    Address,
    Phone,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::Name => "name",
            Field::CategoryLabel => "category label",
            Field::DetailUrl => "detail link",
            Field::Address => "address",
            Field::Phone => "phone",
        };
        f.write_str(name)
    }
}

/// A single field that could not be extracted
///
/// Never escalated: the record is either kept with a sentinel value or, for a
/// missing detail link, dropped from its page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionSkip {
    pub field: Field,

    /// Position of the card, location block, or phone element on its page
    pub position: usize,

    pub reason: String,
}

impl ExtractionSkip {
    pub fn new(field: Field, position: usize, reason: impl Into<String>) -> Self {
        Self {
            field,
            position,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ExtractionSkip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} #{}: {}", self.field, self.position, self.reason)
    }
}
