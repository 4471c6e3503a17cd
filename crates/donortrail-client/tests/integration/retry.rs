//! Integration tests for rate-limit retries and request headers.

use std::time::Duration;

use donortrail_core::{EmployerTotal, Error, TopN};
use reqwest::Url;
use serde_json::{Value, json};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, ResponseTemplate};

use crate::common::{ROSTER_PATH, TestHarness, records, senator_a000001};

#[tokio::test]
async fn test_throttled_page_is_retried_after_server_wait() {
    let harness = TestHarness::start().await;
    harness.mount_roster(json!([senator_a000001()])).await;
    harness.mount_committees("C000123", &["COMM1"]).await;

    // Mounted first, so it answers the first request and then steps aside.
    harness
        .page_mock("COMM1", 1)
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "2"))
        .up_to_n_times(1)
        .mount(&harness.server)
        .await;
    harness
        .mount_page("COMM1", 1, records(&[(Some("Acme Corp"), 500.0)]))
        .await;
    harness.mount_page("COMM1", 2, json!([])).await;

    let detail = harness
        .service()
        .member_detail("A000001", TopN::DEFAULT)
        .await
        .unwrap();

    assert_eq!(detail.donors, vec![EmployerTotal::new("Acme Corp", 500.0)]);
    assert_eq!(harness.recorded_sleeps(), vec![Duration::from_secs(2)]);
}

#[tokio::test]
async fn test_exhausted_budget_reads_as_empty() {
    let harness = TestHarness::start().await;
    harness.mount_roster(json!([senator_a000001()])).await;
    Mock::given(method("GET"))
        .and(path("/candidate/C000123/committees/"))
        .respond_with(ResponseTemplate::new(429))
        .expect(3)
        .mount(&harness.server)
        .await;

    let detail = harness
        .service()
        .member_detail("A000001", TopN::DEFAULT)
        .await
        .unwrap();

    assert!(detail.donors.is_empty());
    // No Retry-After: the default wait, once between each pair of attempts.
    assert_eq!(
        harness.recorded_sleeps(),
        vec![Duration::from_secs(1), Duration::from_secs(1)]
    );
}

#[tokio::test]
async fn test_get_json_reports_rate_limit_exhaustion() {
    let harness = TestHarness::start().await;
    Mock::given(method("GET"))
        .and(path("/limited"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "soon"))
        .expect(3)
        .mount(&harness.server)
        .await;

    let url = Url::parse(&format!("{}/limited?api_key=SECRET", harness.server.uri())).unwrap();
    let err = harness.client().get_json::<Value>(url).await.unwrap_err();

    assert!(
        matches!(&err, Error::RateLimited { attempts: 3, url } if !url.contains("SECRET")),
        "unexpected error: {err:?}"
    );
    assert_eq!(harness.recorded_sleeps().len(), 2);
}

#[tokio::test]
async fn test_non_rate_limit_failure_is_not_retried() {
    let harness = TestHarness::start().await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&harness.server)
        .await;

    let url = Url::parse(&format!("{}/broken", harness.server.uri())).unwrap();
    let err = harness
        .client()
        .get_json_or_empty::<Vec<Value>>(url)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Upstream { status: 500, .. }));
    assert!(harness.recorded_sleeps().is_empty());
}

#[tokio::test]
async fn test_rate_limited_roster_is_fatal() {
    let harness = TestHarness::start().await;
    Mock::given(method("GET"))
        .and(path(ROSTER_PATH))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0.25"))
        .mount(&harness.server)
        .await;

    let err = harness.service().member("A000001").await.unwrap_err();

    assert!(matches!(err, Error::RateLimited { .. }));
    assert_eq!(
        harness.recorded_sleeps(),
        vec![Duration::from_millis(250), Duration::from_millis(250)]
    );
}

#[tokio::test]
async fn test_requests_disable_caching() {
    let harness = TestHarness::start().await;
    Mock::given(method("GET"))
        .and(path(ROSTER_PATH))
        .and(header("cache-control", "no-store"))
        .and(header("pragma", "no-cache"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([senator_a000001()])))
        .expect(1)
        .mount(&harness.server)
        .await;

    let member = harness.service().member("A000001").await.unwrap();
    assert_eq!(member.finance_candidate_id, "C000123");
}

#[tokio::test]
async fn test_malformed_body_is_decode_error() {
    let harness = TestHarness::start().await;
    Mock::given(method("GET"))
        .and(path(ROSTER_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&harness.server)
        .await;

    let err = harness.service().member("A000001").await.unwrap_err();
    assert!(matches!(err, Error::Decode { .. }));
}
