use url::Url;

/// A top-level grouping under which providers are listed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    /// Label as shown on the landing page
    pub name: String,

    /// First listing page for this category, with no pagination offset
    ///
    /// `None` when the category's panel carried no links; such categories
    /// are not crawled.
    pub listing_url: Option<Url>,
}

impl Category {
    pub fn new(name: impl Into<String>, listing_url: Option<Url>) -> Self {
        Self {
            name: name.into(),
            listing_url,
        }
    }

    /// Returns true if the category has a listing to paginate
    pub fn is_crawlable(&self) -> bool {
        self.listing_url.is_some()
    }
}
