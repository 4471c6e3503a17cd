//! Legislator roster: wire format and member resolution.
//!
//! The roster is fetched fresh for every call. Any failure to fetch or decode
//! it is returned to the caller, since no member can be identified without it.

use donortrail_core::config::RosterConfig;
use donortrail_core::de::null_as_default;
use donortrail_core::model::UNKNOWN;
use donortrail_core::{Chamber, Error, Member, MemberFilter, MemberName, Party, Result};
use reqwest::Url;
use serde::Deserialize;

use crate::fetch::FetchClient;

/// Identifier used when a roster entry has no bioguide id.
const UNKNOWN_ID: &str = "unknown";

// ============================================================================
// Wire format
// ============================================================================

/// One legislator as published in the roster JSON.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RosterEntry {
    /// Cross-system identifiers
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: RosterIds,
    /// Name parts
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: RosterName,
    /// Term history, most recent last
    #[serde(default, deserialize_with = "null_as_default")]
    pub terms: Vec<RosterTerm>,
}

/// Identifier block of a roster entry.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RosterIds {
    /// Bioguide id
    #[serde(default)]
    pub bioguide: Option<String>,
    /// Finance-system candidate ids
    #[serde(default, deserialize_with = "null_as_default")]
    pub fec: Vec<String>,
}

/// Name block of a roster entry.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RosterName {
    /// Given name
    #[serde(default)]
    pub first: Option<String>,
    /// Family name
    #[serde(default)]
    pub last: Option<String>,
}

/// One term of service.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RosterTerm {
    /// `"sen"` or `"rep"`
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    /// Party label
    #[serde(default)]
    pub party: Option<String>,
    /// Two-letter state code
    #[serde(default)]
    pub state: Option<String>,
}

impl RosterEntry {
    /// The bioguide id, or `"unknown"` when missing.
    pub fn bioguide_id(&self) -> &str {
        self.id
            .bioguide
            .as_deref()
            .filter(|id| !id.is_empty())
            .unwrap_or(UNKNOWN_ID)
    }

    /// Derives the domain member from the most recent term.
    pub fn into_member(self, photo_base_url: &str) -> Member {
        let bioguide_id = self.bioguide_id().to_string();
        let latest = self.terms.last();

        Member {
            photo_url: Member::photo_url_for(photo_base_url, &bioguide_id),
            name: MemberName::new(
                self.name.first.unwrap_or_default(),
                self.name.last.unwrap_or_default(),
            ),
            party: Party::from_label(latest.and_then(|t| t.party.as_deref())),
            state: latest
                .and_then(|t| t.state.clone())
                .unwrap_or_else(|| UNKNOWN.to_string()),
            chamber: Chamber::from_term_type(latest.and_then(|t| t.kind.as_deref())),
            finance_candidate_id: self.id.fec.into_iter().next().unwrap_or_default(),
            bioguide_id,
        }
    }
}

// ============================================================================
// Resolver
// ============================================================================

/// Looks members up in the roster.
#[derive(Debug, Clone)]
pub struct RosterResolver {
    client: FetchClient,
    roster_url: Url,
    photo_base_url: String,
}

impl RosterResolver {
    /// Creates a resolver for the configured roster source.
    pub fn new(client: FetchClient, config: &RosterConfig) -> Result<Self> {
        let roster_url = Url::parse(&config.url)
            .map_err(|e| Error::config(format!("Invalid roster url {:?}: {e}", config.url)))?;
        Ok(Self {
            client,
            roster_url,
            photo_base_url: config.photo_base_url.clone(),
        })
    }

    /// Fetches and converts the whole roster.
    pub async fn fetch_roster(&self) -> Result<Vec<Member>> {
        let entries: Vec<RosterEntry> = self.client.get_json(self.roster_url.clone()).await?;
        tracing::debug!(count = entries.len(), "Fetched roster");
        Ok(entries
            .into_iter()
            .map(|entry| entry.into_member(&self.photo_base_url))
            .collect())
    }

    /// Members matching `filter`, in roster order.
    pub async fn list_members(&self, filter: &MemberFilter) -> Result<Vec<Member>> {
        let members = self.fetch_roster().await?;
        if filter.is_empty() {
            return Ok(members);
        }
        Ok(members.into_iter().filter(|m| filter.matches(m)).collect())
    }

    /// The member whose bioguide id equals `member_id` exactly.
    ///
    /// Returns [`Error::MemberNotFound`] when no entry matches.
    pub async fn resolve(&self, member_id: &str) -> Result<Member> {
        let entries: Vec<RosterEntry> = self.client.get_json(self.roster_url.clone()).await?;
        entries
            .into_iter()
            .find(|entry| entry.id.bioguide.as_deref() == Some(member_id))
            .map(|entry| entry.into_member(&self.photo_base_url))
            .ok_or_else(|| Error::not_found(member_id))
    }
}
