//! Contribution aggregation across committees and pages.
//!
//! Each committee's schedule is walked with [`paginate`] and drained into its
//! own [`EmployerTotals`]. Committees may be walked concurrently (bounded by
//! `committee_concurrency`), but their partial totals are merged in discovery
//! order, so the ranking, ties included, does not depend on which committee
//! finishes first.

use std::time::Duration;

use donortrail_core::config::{AggregationConfig, FinanceConfig};
use donortrail_core::{Committee, ContributionRecord, EmployerTotal, EmployerTotals, Error, Result, TopN};
use futures::{StreamExt, stream};
use reqwest::Url;
use tokio::time::Instant;

use crate::fetch::{FetchClient, ResultsEnvelope, redact, with_api_key};
use crate::paging::{PageLimits, drain_into, paginate};

/// Sort order requested from the schedule endpoint: largest totals first.
const SORT_BY_TOTAL_DESC: &str = "-total";

/// Sums contributions per employer for a set of committees.
#[derive(Debug, Clone)]
pub struct ContributionAggregator {
    client: FetchClient,
    schedule_url: Url,
    api_key: String,
    limits: PageLimits,
    concurrency: usize,
    deadline: Option<Duration>,
}

impl ContributionAggregator {
    /// Creates an aggregator for the configured schedule endpoint and bounds.
    pub fn new(
        client: FetchClient,
        finance: &FinanceConfig,
        aggregation: &AggregationConfig,
    ) -> Result<Self> {
        let schedule_url = Url::parse(&finance.schedule_url).map_err(|e| {
            Error::config(format!(
                "Invalid schedule url {:?}: {e}",
                finance.schedule_url
            ))
        })?;
        Ok(Self {
            client,
            schedule_url,
            api_key: finance.api_key.clone(),
            limits: PageLimits::from_config(aggregation, None),
            concurrency: aggregation.committee_concurrency.max(1),
            deadline: aggregation.deadline(),
        })
    }

    /// Schedule URL for one committee page.
    pub fn page_url(&self, committee_id: &str, cycle: i32, page: u32) -> Url {
        let mut url = self.schedule_url.clone();
        url.query_pairs_mut()
            .append_pair("cycle", &cycle.to_string())
            .append_pair("committee_id", committee_id)
            .append_pair("per_page", &self.limits.per_page.to_string())
            .append_pair("page", &page.to_string())
            .append_pair("sort", SORT_BY_TOTAL_DESC);
        with_api_key(url, &self.api_key)
    }

    /// Totals per normalized employer across every committee.
    pub async fn aggregate(&self, committees: &[Committee], cycle: i32) -> EmployerTotals {
        let limits = PageLimits {
            deadline: self.deadline.map(|budget| Instant::now() + budget),
            ..self.limits
        };

        // Futures are built up front (they do nothing until polled) rather
        // than in a `StreamExt::map` closure, which keeps this future `Send`.
        let walks: Vec<_> = committees
            .iter()
            .map(|committee| self.committee_totals(committee, cycle, limits))
            .collect();
        let totals = stream::iter(walks)
            .buffered(self.concurrency)
            .fold(EmployerTotals::new(), |mut acc, partial| async move {
                acc.merge(partial);
                acc
            })
            .await;

        tracing::debug!(
            committees = committees.len(),
            employers = totals.len(),
            cycle,
            "Aggregated contributions"
        );
        totals
    }

    /// The `top_n` employers by total, descending; ties keep discovery order.
    pub async fn aggregate_top_donors(
        &self,
        committees: &[Committee],
        cycle: i32,
        top_n: TopN,
    ) -> Vec<EmployerTotal> {
        self.aggregate(committees, cycle).await.top(top_n)
    }

    async fn committee_totals(
        &self,
        committee: &Committee,
        cycle: i32,
        limits: PageLimits,
    ) -> EmployerTotals {
        let committee_id = committee.committee_id.as_str();
        let pages = paginate(limits, |page| self.fetch_page(committee_id, cycle, page));

        let mut totals = EmployerTotals::new();
        let summary = drain_into(pages, &mut totals).await;

        tracing::debug!(
            committee_id,
            pages = summary.pages,
            records = summary.records,
            "Walked committee schedule"
        );
        totals
    }

    /// One page of records; `None` ends the committee's walk.
    async fn fetch_page(
        &self,
        committee_id: &str,
        cycle: i32,
        page: u32,
    ) -> Option<Vec<ContributionRecord>> {
        let url = self.page_url(committee_id, cycle, page);
        let shown = redact(&url);
        match self
            .client
            .get_json_or_empty::<ResultsEnvelope<ContributionRecord>>(url)
            .await
        {
            Ok(envelope) => Some(envelope.results),
            Err(e) => {
                tracing::warn!(
                    committee_id,
                    page,
                    url = %shown,
                    error = %e,
                    "Schedule page failed, keeping partial totals"
                );
                None
            }
        }
    }
}
