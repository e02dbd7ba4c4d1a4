use crate::UrlError;
use url::Url;

/// Tracking parameters removed in addition to the site's volatile ones
const TRACKING_PARAMS: &[&str] = &["fbclid", "gclid", "mc_eid"];

/// Canonicalizes detail-page URLs into the provider dedup key
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed or not HTTP(S)
/// 2. Remove fragment (everything after #)
/// 3. Remove the site's volatile parameters and tracking parameters
/// 4. Sort remaining query parameters by key, then value
/// 5. Remove empty query string (trailing ?)
/// 6. Remove trailing slash (except for root /)
///
/// Host lowercasing and dot-segment removal come from the URL parser itself.
#[derive(Debug, Clone)]
pub struct UrlNormalizer {
    volatile_params: Vec<String>,
}

impl UrlNormalizer {
    /// Creates a normalizer that strips the given volatile parameters
    pub fn new<I, S>(volatile_params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            volatile_params: volatile_params.into_iter().map(Into::into).collect(),
        }
    }

    /// Normalizes a URL
    ///
    /// # Examples
    ///
    /// ```
    /// use provider_harvest::url::UrlNormalizer;
    ///
    /// let normalizer = UrlNormalizer::new(["lid"]);
    /// let url = normalizer
    ///     .normalize("https://Example.com/p/ada/?lid=9f3&b=2&a=1#reviews")
    ///     .unwrap();
    /// assert_eq!(url.as_str(), "https://example.com/p/ada?a=1&b=2");
    /// ```
    pub fn normalize(&self, url_str: &str) -> Result<Url, UrlError> {
        let mut url = Url::parse(url_str).map_err(|e| UrlError::Parse(e.to_string()))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(UrlError::InvalidScheme(format!(
                "Only HTTP and HTTPS schemes are supported, got: {}",
                url.scheme()
            )));
        }

        if url.host_str().is_none() {
            return Err(UrlError::MissingHost);
        }

        url.set_fragment(None);

        if url.query().is_some() {
            let params = self.filter_and_sort_query_params(&url);
            if params.is_empty() {
                url.set_query(None);
            } else {
                url.query_pairs_mut().clear().extend_pairs(params);
            }
        }

        let path = url.path();
        if path.len() > 1 && path.ends_with('/') {
            let trimmed = path.trim_end_matches('/');
            let trimmed = if trimmed.is_empty() { "/" } else { trimmed }.to_string();
            url.set_path(&trimmed);
        }

        Ok(url)
    }

    /// Normalizes a URL, falling back to the raw string when it cannot be parsed
    pub fn dedup_key(&self, url_str: &str) -> String {
        match self.normalize(url_str) {
            Ok(url) => url.to_string(),
            Err(e) => {
                tracing::debug!("Using raw URL as dedup key for {}: {}", url_str, e);
                url_str.to_string()
            }
        }
    }

    fn filter_and_sort_query_params(&self, url: &Url) -> Vec<(String, String)> {
        let mut params: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(key, _)| !self.is_volatile(key))
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        params.sort();
        params
    }

    fn is_volatile(&self, key: &str) -> bool {
        self.volatile_params.iter().any(|p| p == key)
            || TRACKING_PARAMS.contains(&key)
            || key.starts_with("utm_")
    }
}
