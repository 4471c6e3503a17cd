//! The member-detail pipeline: roster → committees → aggregation.

use donortrail_core::{DonorConfig, Member, MemberDetail, MemberFilter, Result, TopN};

use crate::aggregate::ContributionAggregator;
use crate::committees::CommitteeResolver;
use crate::fetch::{FetchClient, RetryPolicy};
use crate::roster::RosterResolver;

/// Answers member and donor queries against the upstream sources.
///
/// Holds no per-request state; every call re-reads the roster and walks the
/// finance API afresh, so a single instance can be shared across requests.
#[derive(Debug, Clone)]
pub struct DonorService {
    roster: RosterResolver,
    committees: CommitteeResolver,
    aggregator: ContributionAggregator,
    cycle: i32,
    default_top_n: TopN,
}

impl DonorService {
    /// Builds the service with a fresh HTTP client.
    pub fn from_config(config: &DonorConfig) -> Result<Self> {
        let client = FetchClient::new(RetryPolicy::from_config(config))?;
        Self::with_client(config, client)
    }

    /// Builds the service around an existing client.
    pub fn with_client(config: &DonorConfig, client: FetchClient) -> Result<Self> {
        Ok(Self {
            roster: RosterResolver::new(client.clone(), &config.roster)?,
            committees: CommitteeResolver::new(client.clone(), &config.finance)?,
            aggregator: ContributionAggregator::new(client, &config.finance, &config.aggregation)?,
            cycle: config.finance.cycle,
            default_top_n: config.default_top_n(),
        })
    }

    /// A member with their `top_n` employer donors for the configured cycle.
    ///
    /// Fails with `MemberNotFound` before any finance call when the id is
    /// not in the roster, and with an upstream error when the roster itself
    /// cannot be read. Committee and schedule failures only shrink the
    /// donor list.
    pub async fn member_detail(&self, member_id: &str, top_n: TopN) -> Result<MemberDetail> {
        let member = self.roster.resolve(member_id).await?;

        let committees = self
            .committees
            .list_committees(&member.finance_candidate_id, self.cycle)
            .await;
        let donors = self
            .aggregator
            .aggregate_top_donors(&committees, self.cycle, top_n)
            .await;

        tracing::info!(
            member_id,
            committees = committees.len(),
            donors = donors.len(),
            cycle = self.cycle,
            "Built member detail"
        );
        Ok(MemberDetail::new(member, donors))
    }

    /// Roster members matching `filter`.
    pub async fn members(&self, filter: &MemberFilter) -> Result<Vec<Member>> {
        self.roster.list_members(filter).await
    }

    /// A single roster member, without finance data.
    pub async fn member(&self, member_id: &str) -> Result<Member> {
        self.roster.resolve(member_id).await
    }

    /// Donor count used when a caller gives none.
    pub fn default_top_n(&self) -> TopN {
        self.default_top_n
    }

    /// Election cycle finance queries are scoped to.
    pub fn cycle(&self) -> i32 {
        self.cycle
    }
}
