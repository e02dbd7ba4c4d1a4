use serde::Deserialize;

/// Browser identification sent with every request
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36";

/// Main configuration structure for Provider-Harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub site: SiteConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub http: HttpConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub selectors: SelectorConfig,
}

/// The directory site being harvested
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Landing page listing every category; also the base for relative links
    #[serde(rename = "root-url")]
    pub root_url: String,

    /// Per-impression query parameters stripped from detail URLs before dedup
    #[serde(rename = "volatile-params", default = "default_volatile_params")]
    pub volatile_params: Vec<String>,

    /// Query parameter carrying the pagination offset
    #[serde(rename = "page-param", default = "default_page_param")]
    pub page_param: String,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Number of provider cards the site serves per listing page
    #[serde(rename = "page-size")]
    pub page_size: u32,

    /// Stop paginating a category once the offset reaches this many records
    ///
    /// `None` keeps paginating until an empty page is served.
    #[serde(rename = "record-ceiling")]
    pub record_ceiling: Option<u32>,

    /// Hard limit on listing pages per category
    #[serde(rename = "max-pages")]
    pub max_pages: u32,

    /// Minimum time between two requests from the same slot (milliseconds)
    #[serde(rename = "request-delay-ms")]
    pub request_delay_ms: u64,

    /// Number of concurrent detail-page workers
    #[serde(rename = "worker-pool-size")]
    pub worker_pool_size: u32,

    /// Retry attempts after the first failure of a retriable fetch
    #[serde(rename = "max-retries")]
    pub max_retries: u32,

    /// Base delay for exponential backoff (milliseconds)
    #[serde(rename = "backoff-base-ms")]
    pub backoff_base_ms: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            page_size: 18,
            record_ceiling: None,
            max_pages: 500,
            request_delay_ms: 2000,
            worker_pool_size: 5,
            max_retries: 3,
            backoff_base_ms: 1000,
        }
    }
}

/// HTTP client configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: 30,
            connect_timeout_secs: 10,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the aggregated JSON dataset
    #[serde(rename = "output-path")]
    pub output_path: String,

    /// Optional path to a markdown run report
    #[serde(rename = "summary-path", default)]
    pub summary_path: Option<String>,
}

/// CSS selectors describing the site's markup
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// Category tab labels on the landing page
    #[serde(rename = "category-label")]
    pub category_label: String,

    /// Category content panels, positionally paired with the labels
    #[serde(rename = "category-panel")]
    pub category_panel: String,

    /// Links inside a category panel
    #[serde(rename = "category-link")]
    pub category_link: String,

    /// Regex matching a trailing path segment that names one item
    #[serde(rename = "item-slug-pattern")]
    pub item_slug_pattern: String,

    /// One provider card on a listing page
    #[serde(rename = "provider-card")]
    pub provider_card: String,

    #[serde(rename = "provider-name")]
    pub provider_name: String,

    #[serde(rename = "provider-category")]
    pub provider_category: String,

    /// Detail-page link inside a card
    #[serde(rename = "provider-link")]
    pub provider_link: String,

    /// One location section on a detail page
    #[serde(rename = "location-block")]
    pub location_block: String,

    /// Address element inside a location block
    #[serde(rename = "location-address")]
    pub location_address: String,

    /// Elements carrying a machine-readable phone number
    #[serde(rename = "phone")]
    pub phone: String,

    /// Attribute holding the phone number
    #[serde(rename = "phone-attr")]
    pub phone_attr: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            category_label: ".specialty-tabs__tab".to_string(),
            category_panel: ".specialty-tabs__panel".to_string(),
            category_link: "a[href]".to_string(),
            item_slug_pattern: r"^(\d+|.*-\d+|.*\.html?)$".to_string(),
            provider_card: "article.search-results__providers-provider".to_string(),
            provider_name: ".provider-name".to_string(),
            provider_category: ".provider-specialty".to_string(),
            provider_link: "a.article-link".to_string(),
            location_block: ".provider-location".to_string(),
            location_address: "address".to_string(),
            phone: "a[href^='tel:']".to_string(),
            phone_attr: "href".to_string(),
        }
    }
}

fn default_volatile_params() -> Vec<String> {
    vec!["lid".to_string()]
}

fn default_page_param() -> String {
    "start".to_string()
}
