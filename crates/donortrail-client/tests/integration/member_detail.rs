//! Integration tests for the member-detail pipeline.

use donortrail_core::{Chamber, EmployerTotal, Error, MemberFilter, Party, TopN};
use serde_json::json;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, ResponseTemplate};

use crate::common::{SCHEDULE_PATH, TestHarness, records, roster_entry, senator_a000001};

#[tokio::test]
async fn test_senator_with_one_committee() {
    let harness = TestHarness::start().await;
    harness.mount_roster(json!([senator_a000001()])).await;
    harness.mount_committees("C000123", &["COMM1"]).await;
    harness
        .mount_page(
            "COMM1",
            1,
            records(&[(Some("Acme Corp"), 500.0), (Some(""), 250.0)]),
        )
        .await;
    harness.mount_page("COMM1", 2, json!([])).await;

    let detail = harness
        .service()
        .member_detail("A000001", TopN::DEFAULT)
        .await
        .expect("member should resolve");

    assert_eq!(detail.bioguide_id, "A000001");
    assert_eq!(detail.chamber, Chamber::Senate);
    assert_eq!(detail.party, Party::Democrat);
    assert_eq!(detail.state, "CA");
    assert_eq!(
        detail.photo_url,
        format!("{}/photos/A000001.jpg", harness.server.uri())
    );
    assert_eq!(
        detail.donors,
        vec![
            EmployerTotal::new("Acme Corp", 500.0),
            EmployerTotal::new("Unknown", 250.0),
        ]
    );
    // Page 2 came back empty, so page 3 is never requested.
    assert_eq!(harness.requests_to(SCHEDULE_PATH).await, 2);
}

#[tokio::test]
async fn test_missing_member_never_reaches_finance_api() {
    let harness = TestHarness::start().await;
    harness.mount_roster(json!([senator_a000001()])).await;
    Mock::given(method("GET"))
        .and(path_regex("^/candidate/.*"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
        .expect(0)
        .mount(&harness.server)
        .await;
    Mock::given(method("GET"))
        .and(path(SCHEDULE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
        .expect(0)
        .mount(&harness.server)
        .await;

    let err = harness
        .service()
        .member_detail("Z999999", TopN::DEFAULT)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::MemberNotFound { ref id } if id == "Z999999"));
}

#[tokio::test]
async fn test_member_lookup_is_case_sensitive() {
    let harness = TestHarness::start().await;
    harness.mount_roster(json!([senator_a000001()])).await;

    let err = harness.service().member("a000001").await.unwrap_err();
    assert!(matches!(err, Error::MemberNotFound { .. }));
}

#[tokio::test]
async fn test_member_without_finance_identity_has_no_donors() {
    let harness = TestHarness::start().await;
    harness
        .mount_roster(json!([roster_entry(
            "B000002",
            &[],
            "Bo",
            "Tanner",
            json!([{"type": "rep", "party": "Independent", "state": "VT"}]),
        )]))
        .await;

    let detail = harness
        .service()
        .member_detail("B000002", TopN::DEFAULT)
        .await
        .unwrap();

    assert_eq!(detail.chamber, Chamber::House);
    assert_eq!(detail.party, Party::Independent);
    assert!(detail.donors.is_empty());
    assert_eq!(harness.requests_to(SCHEDULE_PATH).await, 0);
}

#[tokio::test]
async fn test_roster_failure_is_fatal() {
    let harness = TestHarness::start().await;
    Mock::given(method("GET"))
        .and(path(crate::common::ROSTER_PATH))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&harness.server)
        .await;

    let err = harness
        .service()
        .member_detail("A000001", TopN::DEFAULT)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Upstream { status: 503, .. }));
    assert!(err.is_upstream());
    assert!(harness.recorded_sleeps().is_empty());
}

#[tokio::test]
async fn test_committee_failure_yields_empty_donors() {
    let harness = TestHarness::start().await;
    harness.mount_roster(json!([senator_a000001()])).await;
    Mock::given(method("GET"))
        .and(path("/candidate/C000123/committees/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&harness.server)
        .await;

    let detail = harness
        .service()
        .member_detail("A000001", TopN::DEFAULT)
        .await
        .unwrap();

    assert!(detail.donors.is_empty());
}

#[tokio::test]
async fn test_list_members_with_filters() {
    let harness = TestHarness::start().await;
    harness
        .mount_roster(json!([
            senator_a000001(),
            roster_entry(
                "B000002",
                &[],
                "Bo",
                "Tanner",
                json!([{"type": "rep", "party": "Independent", "state": "VT"}]),
            ),
            roster_entry(
                "C000003",
                &["H000777"],
                "Cy",
                "Adams",
                json!([{"type": "sen", "party": "Republican", "state": "TX"}]),
            ),
        ]))
        .await;
    let service = harness.service();

    let all = service.members(&MemberFilter::default()).await.unwrap();
    assert_eq!(all.len(), 3);

    let senators = service
        .members(&MemberFilter {
            chamber: Some(Chamber::Senate),
            ..Default::default()
        })
        .await
        .unwrap();
    let ids: Vec<_> = senators.iter().map(|m| m.bioguide_id.as_str()).collect();
    assert_eq!(ids, ["A000001", "C000003"]);

    let searched = service
        .members(&MemberFilter {
            search: Some("TANNER".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(searched.len(), 1);
    assert_eq!(searched[0].bioguide_id, "B000002");
}

#[tokio::test]
async fn test_roster_rows_with_null_blocks_are_tolerated() {
    let harness = TestHarness::start().await;
    harness
        .mount_roster(json!([
            senator_a000001(),
            {"id": null, "name": null, "terms": []},
            {"id": {"bioguide": "D000004", "fec": null}, "name": null, "terms": null},
        ]))
        .await;
    let service = harness.service();

    let all = service.members(&MemberFilter::default()).await.unwrap();
    let ids: Vec<_> = all.iter().map(|m| m.bioguide_id.as_str()).collect();
    assert_eq!(ids, ["A000001", "unknown", "D000004"]);

    let member = service.member("A000001").await.unwrap();
    assert_eq!(member.state, "CA");
}
