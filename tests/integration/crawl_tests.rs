//! Integration tests for the harvester
//!
//! These tests use wiremock to create mock directory sites and run the full
//! discovery, pagination, and enrichment cycle end-to-end over HTTP.

use provider_harvest::config::{load_config_with_hash, HttpConfig};
use provider_harvest::crawler::{build_http_client, run_crawl, HttpFetcher, PageSource};
use provider_harvest::{DiscoveryError, FetchError, HarvestError};
use serde_json::{json, Value};
use std::path::Path;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

const LANDING: &str = include_str!("../fixtures/landing.html");
const LANDING_MISMATCH: &str = include_str!("../fixtures/landing_mismatch.html");
const DENTIST_LISTING: &str = include_str!("../fixtures/dentist_listing.html");
const THERAPIST_LISTING: &str = include_str!("../fixtures/therapist_listing.html");
const EMPTY_LISTING: &str = include_str!("../fixtures/empty_listing.html");
const DETAIL_JO_LEE: &str = include_str!("../fixtures/detail_jo_lee.html");
const DETAIL_MAX_ITO: &str = include_str!("../fixtures/detail_max_ito.html");

fn html(body: impl Into<String>) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body.into())
        .insert_header("content-type", "text/html; charset=utf-8")
}

async fn mount_page(server: &MockServer, page_path: &str, body: impl Into<String>) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(html(body))
        .mount(server)
        .await;
}

async fn mount_listing(server: &MockServer, listing_path: &str, offset: &str, body: impl Into<String>) {
    Mock::given(method("GET"))
        .and(path(listing_path))
        .and(query_param("start", offset))
        .respond_with(html(body))
        .mount(server)
        .await;
}

/// Mounts the full fixture site: three categories, one without listings
async fn mount_site(server: &MockServer) {
    let base = server.uri();

    mount_page(server, "/care/", LANDING).await;

    mount_listing(server, "/care/dentist", "0", DENTIST_LISTING.replace("{base}", &base)).await;
    mount_listing(server, "/care/dentist", "18", EMPTY_LISTING).await;
    mount_listing(server, "/care/physical-therapist", "0", THERAPIST_LISTING).await;
    mount_listing(server, "/care/physical-therapist", "18", EMPTY_LISTING).await;

    mount_page(server, "/care/p/jo-lee", DETAIL_JO_LEE).await;
    mount_page(server, "/care/p/max-ito", DETAIL_MAX_ITO).await;
    Mock::given(method("GET"))
        .and(path("/care/p/ada-park"))
        .respond_with(ResponseTemplate::new(404))
        .mount(server)
        .await;
}

/// Writes a config file for a site served at `base`
fn write_config(dir: &Path, base: &str) -> std::path::PathBuf {
    write_config_with_retries(dir, base, 0, 1)
}

fn write_config_with_retries(
    dir: &Path,
    base: &str,
    max_retries: u32,
    backoff_base_ms: u64,
) -> std::path::PathBuf {
    let config_path = dir.join("harvest.toml");
    let toml = format!(
        r#"
[site]
root-url = "{base}/care/"

[crawler]
request-delay-ms = 0
max-retries = {max_retries}
backoff-base-ms = {backoff_base_ms}

[output]
output-path = "{output}"
summary-path = "{summary}"
"#,
        base = base,
        max_retries = max_retries,
        backoff_base_ms = backoff_base_ms,
        output = dir.join("providers.json").display(),
        summary = dir.join("report.md").display(),
    );
    std::fs::write(&config_path, toml).expect("Failed to write config");
    config_path
}

/// Number of requests the server has seen for `page_path`
async fn requests_to(server: &MockServer, page_path: &str) -> usize {
    server
        .received_requests()
        .await
        .expect("Recording disabled")
        .iter()
        .filter(|request| request.url.path() == page_path)
        .count()
}

fn fetcher(max_retries: u32) -> HttpFetcher {
    let client = build_http_client(&HttpConfig::default()).expect("Failed to build client");
    HttpFetcher::with_client(client, max_retries, Duration::from_millis(1))
}

#[tokio::test]
async fn test_full_harvest_of_fixture_site() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();
    mount_site(&mock_server).await;

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config_path = write_config(dir.path(), &base);
    let (config, hash) = load_config_with_hash(&config_path).expect("Failed to load config");

    let outcome = run_crawl(config, Some(hash.clone()), CancellationToken::new())
        .await
        .expect("Harvest failed");

    let written = std::fs::read_to_string(dir.path().join("providers.json"))
        .expect("Output file missing");
    let value: Value = serde_json::from_str(&written).expect("Output is not JSON");

    assert_eq!(
        value,
        json!({
            "Dentist": [
                {
                    "Provider Name": "Dr. Jo Lee",
                    "Company Name": "Dentist",
                    "Number of Locations": 2,
                    "Location Address": [
                        "100 Congress Ave, Suite 200, Austin, TX 78701",
                        "9 Oak St, Round Rock, TX 78664"
                    ],
                    "Phone Number": ["+15125550100", "+15125550199"],
                    "Website Link": format!("{}/care/p/jo-lee", base)
                },
                {
                    "Provider Name": "Max Ito",
                    "Company Name": "N/A",
                    "Number of Locations": 1,
                    "Location Address": ["N/A"],
                    "Phone Number": [],
                    "Website Link": format!("{}/care/p/max-ito", base)
                }
            ],
            "Physical Therapist": [
                {
                    "Provider Name": "Ada Park, DPT",
                    "Company Name": "Physical Therapist",
                    "Number of Locations": 0,
                    "Location Address": [],
                    "Phone Number": [],
                    "Website Link": format!("{}/care/p/ada-park", base)
                }
            ]
        })
    );

    // Keys follow discovery order and the file uses four-space indentation
    assert!(written.starts_with("{\n    \"Dentist\": ["));
    assert!(written.find("\"Dentist\"") < written.find("\"Physical Therapist\""));

    let report = &outcome.report;
    assert_eq!(report.categories_discovered, 3);
    assert_eq!(report.skipped, vec!["Acupuncturist"]);
    assert_eq!(report.total_duplicates(), 1);
    assert_eq!(report.total_detail_failures(), 1);
    assert_eq!(report.status(), "partial");
    assert_eq!(report.config_hash.as_deref(), Some(hash.as_str()));

    let markdown = std::fs::read_to_string(dir.path().join("report.md")).expect("Report missing");
    assert!(markdown.contains("- Acupuncturist"));
    assert!(markdown.contains("| Dentist | 2 | 2 | 1 | 0 |"));
}

#[tokio::test]
async fn test_discovery_mismatch_aborts_before_listings() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/care/", LANDING_MISMATCH).await;
    Mock::given(method("GET"))
        .and(path("/care/dentist"))
        .respond_with(html(EMPTY_LISTING))
        .expect(0)
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config_path = write_config(dir.path(), &mock_server.uri());
    let (config, _) = load_config_with_hash(&config_path).expect("Failed to load config");

    let err = run_crawl(config, None, CancellationToken::new())
        .await
        .expect_err("Mismatched landing page should abort");

    assert!(matches!(
        err,
        HarvestError::Discovery(DiscoveryError::StructureMismatch {
            labels: 3,
            panels: 2
        })
    ));
    assert!(!dir.path().join("providers.json").exists());

    let requests = mock_server.received_requests().await.expect("Recording disabled");
    assert_eq!(requests.len(), 1);
}

#[tokio::test]
async fn test_listing_failure_keeps_partial_output() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();

    // Mounted first so it wins over the fixture's start=18 page
    Mock::given(method("GET"))
        .and(path("/care/dentist"))
        .and(query_param("start", "18"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;
    mount_site(&mock_server).await;

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config_path = write_config(dir.path(), &base);
    let (config, _) = load_config_with_hash(&config_path).expect("Failed to load config");

    let outcome = run_crawl(config, None, CancellationToken::new())
        .await
        .expect("A listing failure should not abort the run");

    let written = std::fs::read_to_string(dir.path().join("providers.json"))
        .expect("Output file missing");
    let value: Value = serde_json::from_str(&written).expect("Output is not JSON");
    assert_eq!(value["Dentist"].as_array().map(Vec::len), Some(2));
    assert_eq!(value["Physical Therapist"].as_array().map(Vec::len), Some(1));

    let dentist = &outcome.report.categories[0];
    assert_eq!(dentist.pages_fetched, 1);
    assert!(dentist.is_partial());
}

#[tokio::test]
async fn test_landing_failure_is_fatal() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/care/"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config_path = write_config(dir.path(), &mock_server.uri());
    let (config, _) = load_config_with_hash(&config_path).expect("Failed to load config");

    let err = run_crawl(config, None, CancellationToken::new())
        .await
        .expect_err("Landing failure should abort");

    assert!(matches!(
        err,
        HarvestError::Fetch(FetchError::HttpStatus { code: 403, .. })
    ));
}

#[tokio::test]
async fn test_cancel_after_first_category_writes_gathered_records() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();
    let cancel = CancellationToken::new();

    // Fires as soon as the second category's first page is served
    let trigger = cancel.clone();
    Mock::given(method("GET"))
        .and(path("/care/physical-therapist"))
        .and(query_param("start", "0"))
        .respond_with(move |_: &Request| {
            trigger.cancel();
            html(THERAPIST_LISTING)
        })
        .mount(&mock_server)
        .await;
    mount_site(&mock_server).await;

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config_path = write_config(dir.path(), &base);
    let (config, _) = load_config_with_hash(&config_path).expect("Failed to load config");

    let outcome = run_crawl(config, None, cancel)
        .await
        .expect("A cancelled run should still succeed");

    let written = std::fs::read_to_string(dir.path().join("providers.json"))
        .expect("Output file missing");
    let value: Value = serde_json::from_str(&written).expect("Output is not JSON");

    let dentists = value["Dentist"].as_array().expect("Dentist missing");
    assert_eq!(dentists.len(), 2);
    assert_eq!(dentists[0]["Provider Name"], "Dr. Jo Lee");
    assert_eq!(dentists[0]["Number of Locations"], 2);
    assert_eq!(dentists[1]["Provider Name"], "Max Ito");

    // The interrupted category keeps its summary without detail data
    let therapists = value["Physical Therapist"].as_array().expect("Therapists missing");
    assert_eq!(therapists.len(), 1);
    assert_eq!(therapists[0]["Provider Name"], "Ada Park, DPT");
    assert_eq!(therapists[0]["Number of Locations"], 0);

    let report = &outcome.report;
    assert!(report.cancelled);
    assert_eq!(report.status(), "cancelled");
    assert_eq!(report.categories[1].unenriched, 1);

    assert_eq!(requests_to(&mock_server, "/care/p/ada-park").await, 0);
    assert_eq!(requests_to(&mock_server, "/care/physical-therapist").await, 1);
}

#[tokio::test]
async fn test_cancel_stops_detail_retries() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();
    let cancel = CancellationToken::new();

    let trigger = cancel.clone();
    Mock::given(method("GET"))
        .and(path("/care/p/jo-lee"))
        .respond_with(move |_: &Request| {
            trigger.cancel();
            ResponseTemplate::new(503)
        })
        .mount(&mock_server)
        .await;
    mount_site(&mock_server).await;

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config_path = write_config_with_retries(dir.path(), &base, 3, 400);
    let (config, _) = load_config_with_hash(&config_path).expect("Failed to load config");

    let started = std::time::Instant::now();
    let outcome = run_crawl(config, None, cancel)
        .await
        .expect("A cancelled run should still succeed");

    // Without cancellation the retries alone would sleep 400 + 800 + 1600ms
    assert!(started.elapsed() < Duration::from_millis(400));
    assert_eq!(requests_to(&mock_server, "/care/p/jo-lee").await, 1);
    assert_eq!(requests_to(&mock_server, "/care/physical-therapist").await, 0);

    let report = &outcome.report;
    assert!(report.cancelled);
    assert_eq!(report.categories.len(), 1);
    assert_eq!(report.categories[0].detail_failures, 1);

    let written = std::fs::read_to_string(dir.path().join("providers.json"))
        .expect("Output file missing");
    let value: Value = serde_json::from_str(&written).expect("Output is not JSON");
    assert_eq!(value["Dentist"][0]["Location Address"], json!([]));
}

#[tokio::test]
async fn test_fetcher_retries_server_errors() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/flaky", "<html>ok</html>").await;

    let body = fetcher(3)
        .fetch(&format!("{}/flaky", mock_server.uri()), &CancellationToken::new())
        .await
        .expect("Fetch should succeed after retries");

    assert_eq!(body, "<html>ok</html>");
    let requests = mock_server.received_requests().await.expect("Recording disabled");
    assert_eq!(requests.len(), 3);
}

#[tokio::test]
async fn test_fetcher_gives_up_after_max_retries() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/down"))
        .respond_with(ResponseTemplate::new(502))
        .expect(3)
        .mount(&mock_server)
        .await;

    let result = fetcher(2)
        .fetch(&format!("{}/down", mock_server.uri()), &CancellationToken::new())
        .await;

    assert!(matches!(
        result,
        Err(FetchError::HttpStatus { code: 502, .. })
    ));
}

#[tokio::test]
async fn test_fetcher_does_not_retry_client_errors() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = fetcher(3)
        .fetch(&format!("{}/missing", mock_server.uri()), &CancellationToken::new())
        .await;

    match result {
        Err(e @ FetchError::HttpStatus { code: 404, .. }) => assert!(!e.is_retriable()),
        other => panic!("Expected 404, got {:?}", other),
    }
}

#[tokio::test]
async fn test_fetcher_sends_browser_headers() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .and(header_exists("user-agent"))
        .and(header_exists("accept"))
        .and(header_exists("accept-language"))
        .respond_with(html("<html></html>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let body = fetcher(0)
        .fetch(&format!("{}/", mock_server.uri()), &CancellationToken::new())
        .await
        .expect("Request without browser headers was not matched");
    assert_eq!(body, "<html></html>");
}
