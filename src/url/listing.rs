//! Listing URL helpers: link resolution, category roots, and page offsets

use regex::Regex;
use url::Url;

/// Resolves an href found on a page to an absolute HTTP(S) URL
///
/// Returns None if the link should be ignored:
/// - empty or fragment-only hrefs
/// - javascript:, mailto:, tel:, data: schemes
/// - hrefs that do not resolve against `base`
pub fn resolve_link(href: &str, base: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    match base.join(href) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => Some(url),
        _ => None,
    }
}

/// Reduces a link taken from a category panel to the category's listing root
///
/// The fragment and any pagination offset are dropped, and a trailing path
/// segment that names a single item (per `item_slug`) is removed.
///
/// # Examples
///
/// ```
/// use provider_harvest::url::category_root;
/// use regex::Regex;
/// use url::Url;
///
/// let slug = Regex::new(r"^(\d+|.*-\d+)$").unwrap();
/// let link = Url::parse("https://example.com/care/physical-therapist/ada-park-1042#top").unwrap();
/// let root = category_root(&link, &slug, "start");
/// assert_eq!(root.as_str(), "https://example.com/care/physical-therapist");
/// ```
pub fn category_root(link: &Url, item_slug: &Regex, page_param: &str) -> Url {
    let mut url = link.clone();
    url.set_fragment(None);

    let last_segment = url
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .map(str::to_string);

    if let Some(segment) = last_segment {
        if item_slug.is_match(&segment) {
            if let Ok(mut segments) = url.path_segments_mut() {
                segments.pop_if_empty().pop();
            }
        }
    }

    remove_query_param(&mut url, page_param);
    url
}

/// Builds the listing page URL for a given offset
///
/// Other query parameters keep their original order; the offset parameter is
/// replaced if already present and appended otherwise.
pub fn page_url(listing: &Url, page_param: &str, offset: u32) -> Url {
    let mut url = listing.clone();
    remove_query_param(&mut url, page_param);
    url.query_pairs_mut()
        .append_pair(page_param, &offset.to_string());
    url
}

fn remove_query_param(url: &mut Url, name: &str) {
    if url.query().is_none() {
        return;
    }

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != name)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    if kept.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(kept);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://directory.example.com/care/").unwrap()
    }

    fn slug() -> Regex {
        Regex::new(r"^(\d+|.*-\d+|.*\.html?)$").unwrap()
    }

    #[test]
    fn test_resolve_site_relative_link() {
        let url = resolve_link("/care/p/ada-park", &base()).unwrap();
        assert_eq!(url.as_str(), "https://directory.example.com/care/p/ada-park");
    }

    #[test]
    fn test_resolve_absolute_link() {
        let url = resolve_link("https://other.example.com/x", &base()).unwrap();
        assert_eq!(url.as_str(), "https://other.example.com/x");
    }

    #[test]
    fn test_skip_special_links() {
        assert!(resolve_link("", &base()).is_none());
        assert!(resolve_link("#reviews", &base()).is_none());
        assert!(resolve_link("javascript:void(0)", &base()).is_none());
        assert!(resolve_link("mailto:a@example.com", &base()).is_none());
        assert!(resolve_link("tel:+15125550100", &base()).is_none());
    }

    #[test]
    fn test_category_root_strips_item_slug() {
        let link = Url::parse("https://directory.example.com/care/dentist/jo-lee-88").unwrap();
        let root = category_root(&link, &slug(), "start");
        assert_eq!(root.as_str(), "https://directory.example.com/care/dentist");
    }

    #[test]
    fn test_category_root_strips_trailing_slash_slug() {
        let link = Url::parse("https://directory.example.com/care/dentist/4471/").unwrap();
        let root = category_root(&link, &slug(), "start");
        assert_eq!(root.as_str(), "https://directory.example.com/care/dentist");
    }

    #[test]
    fn test_category_root_keeps_category_segment() {
        let link = Url::parse(
            "https://directory.example.com/care/search?type=specialty&keyword=Dentist&start=36",
        )
        .unwrap();
        let root = category_root(&link, &slug(), "start");
        assert_eq!(
            root.as_str(),
            "https://directory.example.com/care/search?type=specialty&keyword=Dentist"
        );
    }

    #[test]
    fn test_page_url_appends_offset() {
        let listing = Url::parse("https://directory.example.com/care/search?keyword=PT").unwrap();
        assert_eq!(
            page_url(&listing, "start", 0).as_str(),
            "https://directory.example.com/care/search?keyword=PT&start=0"
        );
        assert_eq!(
            page_url(&listing, "start", 54).as_str(),
            "https://directory.example.com/care/search?keyword=PT&start=54"
        );
    }

    #[test]
    fn test_page_url_replaces_existing_offset() {
        let listing =
            Url::parse("https://directory.example.com/care/search?start=18&keyword=PT").unwrap();
        assert_eq!(
            page_url(&listing, "start", 36).as_str(),
            "https://directory.example.com/care/search?keyword=PT&start=36"
        );
    }

    #[test]
    fn test_page_url_without_query() {
        let listing = Url::parse("https://directory.example.com/care/dentist").unwrap();
        assert_eq!(
            page_url(&listing, "start", 18).as_str(),
            "https://directory.example.com/care/dentist?start=18"
        );
    }
}
