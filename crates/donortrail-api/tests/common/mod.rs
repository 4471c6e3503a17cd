//! Common test utilities for donortrail-api integration tests.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use donortrail_api::{AppState, router};
use donortrail_client::{DonorService, FetchClient, RetryPolicy, SleepFn};
use donortrail_core::DonorConfig;
use serde_json::{Value, json};
use tower::ServiceExt;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Mock upstream plus a router wired to it.
pub struct TestHarness {
    /// Mock roster and finance upstream
    pub server: MockServer,
    /// Configuration pointing at `server`
    pub config: DonorConfig,
}

impl TestHarness {
    /// Starts a mock upstream.
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        let uri = server.uri();

        let mut config = DonorConfig::default();
        config.roster.url = format!("{uri}/roster.json");
        config.roster.photo_base_url = format!("{uri}/photos");
        config.finance.base_url = uri.clone();
        config.finance.schedule_url = format!("{uri}/schedule/");
        config.finance.api_key = "TEST_KEY".to_string();

        Self { server, config }
    }

    /// The router under test; rate-limit waits complete immediately.
    pub fn router(&self) -> Router {
        let no_wait: SleepFn = Arc::new(|_| Box::pin(async {}));
        let client = FetchClient::new(RetryPolicy::from_config(&self.config))
            .unwrap()
            .with_sleeper(no_wait);
        let service = DonorService::with_client(&self.config, client).unwrap();
        router(AppState::new(service))
    }

    /// Sends `GET uri` through the router and decodes the JSON body.
    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        let response = self
            .router()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    /// Serves the standard two-member roster.
    pub async fn mount_roster(&self) {
        self.mount_roster_status(200, roster()).await;
    }

    /// Serves `body` with `status` as the roster.
    pub async fn mount_roster_status(&self, status: u16, body: Value) {
        Mock::given(method("GET"))
            .and(path("/roster.json"))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// Serves committee COMM1 for candidate C000123 with a single page of records.
    pub async fn mount_finance(&self, rows: Value) {
        Mock::given(method("GET"))
            .and(path("/candidate/C000123/committees/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [{"committee_id": "COMM1", "name": "Friends of Ada", "cycles": [2024]}]
            })))
            .mount(&self.server)
            .await;
        Mock::given(method("GET"))
            .and(path("/schedule/"))
            .and(query_param("committee_id", "COMM1"))
            .and(query_param("page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": rows })))
            .mount(&self.server)
            .await;
        Mock::given(method("GET"))
            .and(path("/schedule/"))
            .and(query_param("committee_id", "COMM1"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": [] })))
            .mount(&self.server)
            .await;
    }
}

/// A senator linked to candidate C000123 and an unlinked representative.
pub fn roster() -> Value {
    json!([
        {
            "id": {"bioguide": "A000001", "fec": ["C000123"]},
            "name": {"first": "Ada", "last": "Lovelace"},
            "terms": [
                {"type": "rep", "party": "Republican", "state": "NY"},
                {"type": "sen", "party": "Democrat", "state": "CA"}
            ]
        },
        {
            "id": {"bioguide": "B000002"},
            "name": {"first": "Bo", "last": "Tanner"},
            "terms": [{"type": "rep", "party": "Independent", "state": "VT"}]
        }
    ])
}
