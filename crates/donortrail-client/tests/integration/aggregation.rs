//! Integration tests for contribution aggregation bounds and merging.

use std::time::Duration;

use donortrail_core::{EmployerTotal, TopN};
use serde_json::json;
use wiremock::ResponseTemplate;

use crate::common::{SCHEDULE_PATH, TestHarness, records, senator_a000001};

#[tokio::test]
async fn test_page_cap_limits_records_per_committee() {
    let harness = TestHarness::start().await;
    harness.mount_roster(json!([senator_a000001()])).await;
    harness.mount_committees("C000123", &["BIG"]).await;

    let full_page = records(&vec![(Some("Bulk Donor"), 1.0); 100]);
    for page in 1..=7 {
        harness.mount_page("BIG", page, full_page.clone()).await;
    }

    let detail = harness
        .service()
        .member_detail("A000001", TopN::DEFAULT)
        .await
        .unwrap();

    assert_eq!(detail.donors, vec![EmployerTotal::new("Bulk Donor", 500.0)]);
    assert_eq!(harness.requests_to(SCHEDULE_PATH).await, 5);
}

#[tokio::test]
async fn test_failed_page_keeps_partial_and_other_committees() {
    let harness = TestHarness::start().await;
    harness.mount_roster(json!([senator_a000001()])).await;
    harness.mount_committees("C000123", &["COMM1", "COMM2"]).await;

    harness
        .mount_page("COMM1", 1, records(&[(Some("Initech"), 40.0)]))
        .await;
    harness
        .page_mock("COMM1", 2)
        .respond_with(ResponseTemplate::new(500))
        .mount(&harness.server)
        .await;
    harness
        .page_mock("COMM1", 3)
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"employer": "Never Seen", "total": 1_000_000.0}]
        })))
        .expect(0)
        .mount(&harness.server)
        .await;

    harness
        .mount_page(
            "COMM2",
            1,
            records(&[(Some("Globex"), 90.0), (Some("Initech"), 15.0)]),
        )
        .await;
    harness.mount_page("COMM2", 2, json!([])).await;

    let detail = harness
        .service()
        .member_detail("A000001", TopN::new(10).unwrap())
        .await
        .unwrap();

    assert_eq!(
        detail.donors,
        vec![
            EmployerTotal::new("Globex", 90.0),
            EmployerTotal::new("Initech", 55.0),
        ]
    );
}

#[tokio::test]
async fn test_whitespace_variants_merge_across_committees() {
    let harness = TestHarness::start().await;
    harness.mount_roster(json!([senator_a000001()])).await;
    harness.mount_committees("C000123", &["COMM1", "COMM2"]).await;
    harness
        .mount_page("COMM1", 1, records(&[(Some("Acme Corp"), 200.0), (None, 5.0)]))
        .await;
    harness.mount_page("COMM1", 2, json!([])).await;
    harness
        .mount_page("COMM2", 1, records(&[(Some("  Acme Corp "), 300.0)]))
        .await;
    harness.mount_page("COMM2", 2, json!([])).await;

    let detail = harness
        .service()
        .member_detail("A000001", TopN::DEFAULT)
        .await
        .unwrap();

    assert_eq!(
        detail.donors,
        vec![
            EmployerTotal::new("Acme Corp", 500.0),
            EmployerTotal::new("Unknown", 5.0),
        ]
    );
}

#[tokio::test]
async fn test_lenient_amounts() {
    let harness = TestHarness::start().await;
    harness.mount_roster(json!([senator_a000001()])).await;
    harness.mount_committees("C000123", &["COMM1"]).await;
    harness
        .mount_page(
            "COMM1",
            1,
            json!([
                {"employer": "Acme Corp", "total": "120.50"},
                {"employer": "Acme Corp", "total": null},
                {"employer": "Acme Corp", "total": "n/a"},
                {"employer": "Initech"}
            ]),
        )
        .await;
    harness.mount_page("COMM1", 2, json!([])).await;

    let detail = harness
        .service()
        .member_detail("A000001", TopN::DEFAULT)
        .await
        .unwrap();

    assert_eq!(
        detail.donors,
        vec![
            EmployerTotal::new("Acme Corp", 120.5),
            EmployerTotal::new("Initech", 0.0),
        ]
    );
}

/// Three committees with tied totals, the first one answering slowest.
async fn mount_tied_committees(harness: &TestHarness) {
    harness.mount_roster(json!([senator_a000001()])).await;
    harness
        .mount_committees("C000123", &["SLOW", "MID", "FAST"])
        .await;

    let delays = [("SLOW", 300), ("MID", 100), ("FAST", 0)];
    for (committee, delay_ms) in delays {
        harness
            .page_mock(committee, 1)
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({
                        "results": [{"employer": format!("{committee} Inc"), "total": 100.0}]
                    }))
                    .set_delay(Duration::from_millis(delay_ms)),
            )
            .mount(&harness.server)
            .await;
        harness.mount_page(committee, 2, json!([])).await;
    }
}

#[tokio::test]
async fn test_concurrency_does_not_change_ranking() {
    let sequential = TestHarness::start().await;
    mount_tied_committees(&sequential).await;

    let mut parallel = TestHarness::start().await;
    parallel.config.aggregation.committee_concurrency = 4;
    mount_tied_committees(&parallel).await;

    let top = TopN::new(3).unwrap();
    let one = sequential
        .service()
        .member_detail("A000001", top)
        .await
        .unwrap();
    let four = parallel
        .service()
        .member_detail("A000001", top)
        .await
        .unwrap();

    let names: Vec<_> = four.donors.iter().map(|d| d.employer.as_str()).collect();
    assert_eq!(names, ["SLOW Inc", "MID Inc", "FAST Inc"]);
    assert_eq!(one.donors, four.donors);
}

#[tokio::test]
async fn test_elapsed_deadline_requests_no_pages() {
    let mut harness = TestHarness::start().await;
    harness.config.aggregation.deadline_secs = Some(0);
    harness.mount_roster(json!([senator_a000001()])).await;
    harness.mount_committees("C000123", &["COMM1"]).await;
    harness
        .mount_page("COMM1", 1, records(&[(Some("Acme Corp"), 500.0)]))
        .await;

    let detail = harness
        .service()
        .member_detail("A000001", TopN::DEFAULT)
        .await
        .unwrap();

    assert!(detail.donors.is_empty());
    assert_eq!(harness.requests_to(SCHEDULE_PATH).await, 0);
}

#[tokio::test]
async fn test_top_n_truncates_ranking() {
    let harness = TestHarness::start().await;
    harness.mount_roster(json!([senator_a000001()])).await;
    harness.mount_committees("C000123", &["COMM1"]).await;
    harness
        .mount_page(
            "COMM1",
            1,
            records(&[
                (Some("A"), 10.0),
                (Some("B"), 40.0),
                (Some("C"), 30.0),
                (Some("D"), 20.0),
            ]),
        )
        .await;
    harness.mount_page("COMM1", 2, json!([])).await;

    let detail = harness
        .service()
        .member_detail("A000001", TopN::new(2).unwrap())
        .await
        .unwrap();

    let names: Vec<_> = detail.donors.iter().map(|d| d.employer.as_str()).collect();
    assert_eq!(names, ["B", "C"]);
}
