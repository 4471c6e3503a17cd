//! Router and request handlers.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use donortrail_client::DonorService;
use donortrail_core::{Member, MemberDetail, MemberFilter, TopN};
use serde_json::{Value, json};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::Result;

/// Service name reported by the health endpoint.
pub const SERVICE_NAME: &str = "donortrail";

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    service: Arc<DonorService>,
}

impl AppState {
    /// Wraps the pipeline for sharing across requests.
    pub fn new(service: DonorService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(health))
        .route("/members", get(list_members))
        .route("/members/{id}", get(get_member))
        .route("/member-detail/{id}", get(member_detail))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}

// ============================================================================
// Query parameters
// ============================================================================

/// Raw query pairs. Extracting these never fails, so malformed or repeated
/// parameters reach the handlers instead of being rejected by axum.
type QueryPairs = Query<Vec<(String, String)>>;

/// First value given for `key`.
fn first_value(pairs: &[(String, String)], key: &str) -> Option<String> {
    pairs
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.clone())
}

/// `?count=N`; kept as text so that malformed values fall back to the default
/// instead of being rejected.
#[derive(Debug, Default)]
pub struct DetailQuery {
    /// Requested donor count
    pub count: Option<String>,
}

impl DetailQuery {
    /// Reads the first `count`; later repeats are ignored.
    pub fn from_pairs(pairs: &[(String, String)]) -> Self {
        Self {
            count: first_value(pairs, "count"),
        }
    }
}

/// Roster listing filters. Values that do not name a party or chamber are ignored.
#[derive(Debug, Default)]
pub struct MembersQuery {
    /// Party label, case-insensitive
    pub party: Option<String>,
    /// `house` or `senate`, case-insensitive
    pub chamber: Option<String>,
    /// Name substring
    pub search: Option<String>,
}

impl MembersQuery {
    /// Reads the first value of each filter.
    pub fn from_pairs(pairs: &[(String, String)]) -> Self {
        Self {
            party: first_value(pairs, "party"),
            chamber: first_value(pairs, "chamber"),
            search: first_value(pairs, "search"),
        }
    }

    /// Converts to a roster filter.
    pub fn into_filter(self) -> MemberFilter {
        MemberFilter {
            party: self.party.as_deref().and_then(|p| p.parse().ok()),
            chamber: self.chamber.as_deref().and_then(|c| c.parse().ok()),
            search: self.search.filter(|s| !s.trim().is_empty()),
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn list_members(
    State(state): State<AppState>,
    Query(pairs): QueryPairs,
) -> Result<Json<Vec<Member>>> {
    let filter = MembersQuery::from_pairs(&pairs).into_filter();
    let members = state.service.members(&filter).await?;
    tracing::debug!(count = members.len(), "Listed members");
    Ok(Json(members))
}

async fn get_member(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Member>> {
    Ok(Json(state.service.member(&id).await?))
}

async fn member_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(pairs): QueryPairs,
) -> Result<Json<MemberDetail>> {
    let query = DetailQuery::from_pairs(&pairs);
    let top_n = TopN::parse_or(query.count.as_deref(), state.service.default_top_n());
    tracing::info!(bioguide_id = %id, count = top_n.get(), "Member detail requested");
    Ok(Json(state.service.member_detail(&id, top_n).await?))
}
