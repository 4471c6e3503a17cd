//! Domain model: roster members, finance committees, contribution records
//! and the per-member response entity.
//!
//! Everything here is request-scoped and immutable once built. Wire field
//! names follow the JSON the HTTP layer returns (`camelCase`), except for
//! [`Committee`] and [`ContributionRecord`], which mirror the finance API.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::de::{lenient_amount, null_as_default};

/// Employer key used when a record has no usable employer.
pub const UNKNOWN_EMPLOYER: &str = "Unknown";

/// Placeholder for missing roster text fields (party, state).
pub const UNKNOWN: &str = "Unknown";

// ============================================================================
// Party / Chamber
// ============================================================================

/// Party affiliation from a member's most recent term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Party {
    /// Democratic Party
    Democrat,
    /// Republican Party
    Republican,
    /// Independent or unaffiliated
    Independent,
    /// Absent or unrecognised in the roster
    Unknown,
}

impl Party {
    /// Maps a roster party label to a [`Party`], defaulting to `Unknown`.
    pub fn from_label(label: Option<&str>) -> Self {
        match label {
            Some("Democrat") => Party::Democrat,
            Some("Republican") => Party::Republican,
            Some("Independent") => Party::Independent,
            _ => Party::Unknown,
        }
    }

    /// Returns the roster label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Party::Democrat => "Democrat",
            Party::Republican => "Republican",
            Party::Independent => "Independent",
            Party::Unknown => UNKNOWN,
        }
    }
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Party {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "democrat" => Ok(Party::Democrat),
            "republican" => Ok(Party::Republican),
            "independent" => Ok(Party::Independent),
            "unknown" => Ok(Party::Unknown),
            _ => Err(UnknownLabel(s.to_string())),
        }
    }
}

/// Legislative chamber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Chamber {
    /// House of Representatives
    House,
    /// Senate
    Senate,
}

impl Chamber {
    /// Roster term type code for senators.
    pub const SENATE_CODE: &'static str = "sen";

    /// Maps a roster term type code: `"sen"` is the Senate, anything else the House.
    pub fn from_term_type(code: Option<&str>) -> Self {
        match code {
            Some(Self::SENATE_CODE) => Chamber::Senate,
            _ => Chamber::House,
        }
    }

    /// Returns the display label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Chamber::House => "House",
            Chamber::Senate => "Senate",
        }
    }
}

impl fmt::Display for Chamber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Chamber {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "house" => Ok(Chamber::House),
            "senate" => Ok(Chamber::Senate),
            _ => Err(UnknownLabel(s.to_string())),
        }
    }
}

/// A party or chamber label that does not name a known value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown label: {0}")]
pub struct UnknownLabel(pub String);

// ============================================================================
// Member
// ============================================================================

/// A member's given and family name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberName {
    /// Given name
    pub first: String,
    /// Family name
    pub last: String,
}

impl MemberName {
    /// Creates a name from its parts.
    pub fn new(first: impl Into<String>, last: impl Into<String>) -> Self {
        Self {
            first: first.into(),
            last: last.into(),
        }
    }

    /// Returns `"first last"`.
    pub fn full(&self) -> String {
        format!("{} {}", self.first, self.last)
    }
}

impl fmt::Display for MemberName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.first, self.last)
    }
}

/// A legislator's identity as derived from the roster's most recent term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    /// Stable legislator identifier (primary key)
    pub bioguide_id: String,
    /// Given and family name
    pub name: MemberName,
    /// Party from the most recent term
    pub party: Party,
    /// Two-letter state code from the most recent term, or `"Unknown"`
    pub state: String,
    /// Chamber from the most recent term's type code
    pub chamber: Chamber,
    /// Finance-system candidate id; empty when the member is not linked
    pub finance_candidate_id: String,
    /// Portrait URL derived from the bioguide id
    pub photo_url: String,
}

impl Member {
    /// Builds the portrait URL for a bioguide id under `base`.
    pub fn photo_url_for(base: &str, bioguide_id: &str) -> String {
        format!("{}/{bioguide_id}.jpg", base.trim_end_matches('/'))
    }

    /// Returns `true` if the member is linked to a finance-system candidate.
    pub fn has_finance_identity(&self) -> bool {
        !self.finance_candidate_id.is_empty()
    }
}

/// Optional roster listing filters.
///
/// `party` and `chamber` match exactly; `search` is a case-insensitive
/// substring match against `"first last"`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberFilter {
    /// Keep only members of this party
    pub party: Option<Party>,
    /// Keep only members of this chamber
    pub chamber: Option<Chamber>,
    /// Keep only members whose full name contains this text
    pub search: Option<String>,
}

impl MemberFilter {
    /// Returns `true` if no criterion is set.
    pub fn is_empty(&self) -> bool {
        self.party.is_none()
            && self.chamber.is_none()
            && self.search.as_deref().is_none_or(|s| s.trim().is_empty())
    }

    /// Returns `true` if `member` satisfies every criterion.
    pub fn matches(&self, member: &Member) -> bool {
        if self.party.is_some_and(|p| p != member.party) {
            return false;
        }
        if self.chamber.is_some_and(|c| c != member.chamber) {
            return false;
        }
        match self.search.as_deref().map(str::trim) {
            Some(needle) if !needle.is_empty() => member
                .name
                .full()
                .to_lowercase()
                .contains(&needle.to_lowercase()),
            _ => true,
        }
    }
}

// ============================================================================
// Finance entities
// ============================================================================

/// A campaign committee registered to a candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Committee {
    /// Finance-system committee id (primary key)
    pub committee_id: String,
    /// Committee display name
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    /// Election cycles the committee was active in
    #[serde(default, deserialize_with = "null_as_default")]
    pub cycles: BTreeSet<i32>,
}

impl Committee {
    /// Creates a committee with no recorded cycles.
    pub fn new(committee_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            committee_id: committee_id.into(),
            name: name.into(),
            cycles: BTreeSet::new(),
        }
    }
}

/// One row of the contribution schedule: an employer and an amount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContributionRecord {
    /// Employer as reported by the contributor
    #[serde(default)]
    pub employer: Option<String>,
    /// Contribution amount; `0.0` when absent or invalid
    #[serde(rename = "total", default, deserialize_with = "lenient_amount")]
    pub amount: f64,
}

impl ContributionRecord {
    /// Creates a record.
    pub fn new(employer: Option<&str>, amount: f64) -> Self {
        Self {
            employer: employer.map(str::to_string),
            amount,
        }
    }

    /// Returns the normalized employer this record aggregates under.
    pub fn employer_key(&self) -> String {
        normalize_employer(self.employer.as_deref())
    }
}

/// Normalizes a reported employer: trims whitespace, `"Unknown"` if nothing is left.
///
/// No case folding is applied; `"ACME"` and `"Acme"` stay distinct.
pub fn normalize_employer(raw: Option<&str>) -> String {
    match raw.map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => UNKNOWN_EMPLOYER.to_string(),
    }
}

/// Summed contributions for one normalized employer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployerTotal {
    /// Normalized employer name
    pub employer: String,
    /// Sum of all contribution amounts for this employer
    pub total_amount: f64,
}

impl EmployerTotal {
    /// Creates an employer total.
    pub fn new(employer: impl Into<String>, total_amount: f64) -> Self {
        Self {
            employer: employer.into(),
            total_amount,
        }
    }
}

/// Response entity: a member's identity plus their top employer donors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberDetail {
    /// Stable legislator identifier
    pub bioguide_id: String,
    /// Given and family name
    pub name: MemberName,
    /// Party from the most recent term
    pub party: Party,
    /// State from the most recent term
    pub state: String,
    /// Chamber from the most recent term
    pub chamber: Chamber,
    /// Portrait URL
    pub photo_url: String,
    /// Top employers by total amount, descending
    pub donors: Vec<EmployerTotal>,
}

impl MemberDetail {
    /// Combines a resolved member with their ranked donors.
    pub fn new(member: Member, donors: Vec<EmployerTotal>) -> Self {
        Self {
            bioguide_id: member.bioguide_id,
            name: member.name,
            party: member.party,
            state: member.state,
            chamber: member.chamber,
            photo_url: member.photo_url,
            donors,
        }
    }
}

// ============================================================================
// TopN
// ============================================================================

/// How many donors to return; always at least one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TopN(usize);

impl TopN {
    /// Default donor count when the caller does not supply a usable one.
    pub const DEFAULT: TopN = TopN(3);

    /// Creates a `TopN`, or `None` for zero.
    pub fn new(n: usize) -> Option<Self> {
        (n > 0).then_some(Self(n))
    }

    /// Parses caller input, falling back to `fallback` when it is missing,
    /// non-numeric or not positive.
    pub fn parse_or(raw: Option<&str>, fallback: TopN) -> Self {
        raw.and_then(|s| s.trim().parse::<usize>().ok())
            .and_then(Self::new)
            .unwrap_or(fallback)
    }

    /// Returns the count.
    pub fn get(self) -> usize {
        self.0
    }
}

impl Default for TopN {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for TopN {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
