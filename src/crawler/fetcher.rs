//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with the fixed browser header set
//! - GET requests returning raw page bodies
//! - Error classification into transport and status failures
//! - Retry with exponential backoff for transient failures

use crate::config::{CrawlerConfig, HttpConfig};
use crate::crawler::retry::retry_with_backoff;
use crate::FetchError;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::Client;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Anything that can return the body of a page
///
/// The crawl pipeline only sees this trait, so tests can substitute an
/// in-memory site for the network.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetches `url` and returns the response body
    ///
    /// Once `cancel` fires no further attempts are made for this URL; the
    /// last failure is returned instead.
    async fn fetch(&self, url: &str, cancel: &CancellationToken) -> Result<String, FetchError>;
}

/// Builds an HTTP client with the fixed request headers
///
/// Every request carries the configured browser `User-Agent` plus static
/// `Accept` and `Accept-Language` headers. No cookie store is enabled.
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("text/html,application/xhtml+xml;q=0.9,*/*;q=0.8"),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

    Client::builder()
        .user_agent(config.user_agent.as_str())
        .default_headers(headers)
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()
}

/// [`PageSource`] backed by a reqwest client
///
/// # Retry Logic
///
/// | Condition | Action |
/// |-----------|--------|
/// | HTTP 2xx | Return body |
/// | HTTP 4xx | Immediate → `HttpStatus` |
/// | HTTP 5xx | Retry up to `max_retries` times with backoff |
/// | Timeout / connect / reset | Retry up to `max_retries` times with backoff |
/// | Body read failure | Retry up to `max_retries` times with backoff |
/// | Cancelled | Return the last failure without retrying |
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    max_retries: u32,
    backoff_base: Duration,
}

impl HttpFetcher {
    /// Creates a fetcher from the HTTP and crawler configuration
    pub fn new(http: &HttpConfig, crawler: &CrawlerConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::with_client(
            build_http_client(http)?,
            crawler.max_retries,
            Duration::from_millis(crawler.backoff_base_ms),
        ))
    }

    /// Wraps an existing client
    pub fn with_client(client: Client, max_retries: u32, backoff_base: Duration) -> Self {
        Self {
            client,
            max_retries,
            backoff_base,
        }
    }

    async fn fetch_once(&self, url: &str) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| transport_error(url, &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                url: url.to_string(),
                code: status.as_u16(),
            });
        }

        response.text().await.map_err(|e| transport_error(url, &e))
    }
}

#[async_trait]
impl PageSource for HttpFetcher {
    async fn fetch(&self, url: &str, cancel: &CancellationToken) -> Result<String, FetchError> {
        tracing::trace!("GET {}", url);
        retry_with_backoff(self.max_retries, self.backoff_base, cancel, || {
            self.fetch_once(url)
        })
        .await
    }
}

/// Classifies a reqwest failure as a transport error
fn transport_error(url: &str, error: &reqwest::Error) -> FetchError {
    let message = if error.is_timeout() {
        "request timeout".to_string()
    } else if error.is_connect() {
        format!("connection failed: {}", error)
    } else {
        error.to_string()
    };

    FetchError::Transport {
        url: url.to_string(),
        message,
    }
}
