//! End-to-end searches against a mock Custom Search endpoint

use querysmith::network::HttpClient;
use querysmith::quota::{QuotaLimits, QuotaTracker};
use querysmith::search::{RateLimitOrigin, SearchClient, SearchError};
use querysmith::Settings;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio_test::{assert_err, assert_ok};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SEARCH_PATH: &str = "/customsearch/v1";

fn items(start: u32, count: u32) -> Value {
    let items: Vec<Value> = (start..start + count)
        .map(|i| {
            json!({
                "title": format!("Result {i}"),
                "link": format!("https://www.nasa.gov/doc/{i}"),
                "snippet": format!("Snippet {i}"),
                "displayLink": "www.nasa.gov",
                "formattedUrl": format!("www.nasa.gov/doc/{i}"),
            })
        })
        .collect();
    json!({ "items": items })
}

fn settings(server: &MockServer) -> Settings {
    let mut settings = Settings::default();
    settings.google.api_key = "test-key".to_string();
    settings.google.cse_id = "test-cx".to_string();
    settings.google.base_url = format!("{}{}", server.uri(), SEARCH_PATH);
    settings.search.page_delay_ms = 0;
    settings
}

fn client(server: &MockServer, quota: Arc<QuotaTracker>) -> SearchClient {
    let settings = settings(server);
    let http = HttpClient::new(Duration::from_secs(5)).unwrap();
    SearchClient::new(&settings, Arc::new(http), quota)
}

fn quota() -> Arc<QuotaTracker> {
    Arc::new(QuotaTracker::new(QuotaLimits {
        per_day: 100,
        per_minute: 10,
    }))
}

#[tokio::test]
async fn paginates_with_backend_parameters() {
    let server = MockServer::start().await;
    for (start, num) in [(1, 10), (11, 10), (21, 5)] {
        Mock::given(method("GET"))
            .and(path(SEARCH_PATH))
            .and(query_param("q", "\"solar\" site:nasa.gov"))
            .and(query_param("cx", "test-cx"))
            .and(query_param("key", "test-key"))
            .and(query_param("safe", "medium"))
            .and(query_param("start", start.to_string()))
            .and(query_param("num", num.to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_json(items(start, num)))
            .expect(1)
            .mount(&server)
            .await;
    }

    let quota = quota();
    let results = client(&server, quota.clone())
        .search("\"solar\" site:nasa.gov", Some(25))
        .await
        .unwrap();

    assert_eq!(results.len(), 25);
    assert_eq!(results[0].title, "Result 1");
    assert_eq!(results[0].domain, "www.nasa.gov");
    assert_eq!(results[24].rank, 25);
    assert_eq!(results[24].url, "https://www.nasa.gov/doc/25");
    assert_eq!(quota.status().daily_requests_used, 3);
}

#[tokio::test]
async fn stops_after_short_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(items(1, 4)))
        .expect(1)
        .mount(&server)
        .await;

    let results = assert_ok!(client(&server, quota()).search("rare topic", Some(20)).await);
    assert_eq!(results.len(), 4);
}

#[tokio::test]
async fn backend_rate_limit() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let err = assert_err!(client(&server, quota()).search("rust", Some(5)).await);
    assert!(matches!(
        err,
        SearchError::RateLimitExceeded {
            origin: RateLimitOrigin::Backend,
            ..
        }
    ));
}

#[tokio::test]
async fn forbidden_carries_backend_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": {"code": 403, "message": "Requests from this referer are blocked."}
        })))
        .mount(&server)
        .await;

    let err = assert_err!(client(&server, quota()).search("rust", Some(5)).await);
    match err {
        SearchError::Authorization { message } => {
            assert_eq!(message, "Requests from this referer are blocked.")
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn server_error_keeps_truncated_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable ".repeat(40)))
        .mount(&server)
        .await;

    let err = assert_err!(client(&server, quota()).search("rust", Some(5)).await);
    match err {
        SearchError::Backend { status, body } => {
            assert_eq!(status, 503);
            assert_eq!(body.chars().count(), 200);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn error_envelope_with_ok_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": {"code": 403, "message": "Custom Search API has not been used in project"}
        })))
        .mount(&server)
        .await;

    let err = assert_err!(client(&server, quota()).search("rust", Some(5)).await);
    assert!(matches!(err, SearchError::Authorization { .. }));
}

#[tokio::test]
async fn slow_backend_times_out_whole_call() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(items(1, 10))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let client = client(&server, quota()).with_timeout(Duration::from_millis(200));
    let err = assert_err!(client.search("rust", Some(5)).await);
    assert!(matches!(err, SearchError::Network(_)));
}
