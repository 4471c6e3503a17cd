//! Candidate → committee lookup.

use donortrail_core::config::FinanceConfig;
use donortrail_core::{Committee, Error, Result};
use reqwest::Url;

use crate::fetch::{FetchClient, ResultsEnvelope, redact, with_api_key};

/// Lists the committees registered to a finance-system candidate.
#[derive(Debug, Clone)]
pub struct CommitteeResolver {
    client: FetchClient,
    base_url: Url,
    api_key: String,
}

impl CommitteeResolver {
    /// Creates a resolver rooted at the configured finance API.
    pub fn new(client: FetchClient, config: &FinanceConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            Error::config(format!("Invalid finance base url {:?}: {e}", config.base_url))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(Error::config(format!(
                "Finance base url cannot carry a path: {}",
                config.base_url
            )));
        }
        Ok(Self {
            client,
            base_url,
            api_key: config.api_key.clone(),
        })
    }

    /// `{base}/candidate/{id}/committees/?cycle=..&api_key=..`
    pub fn committees_url(&self, candidate_id: &str, cycle: i32) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::config("Finance base url cannot carry a path"))?
            .pop_if_empty()
            .extend(["candidate", candidate_id, "committees", ""]);
        url.query_pairs_mut()
            .append_pair("cycle", &cycle.to_string());
        Ok(with_api_key(url, &self.api_key))
    }

    /// Committees for `candidate_id` in `cycle`, in the order the API lists them.
    ///
    /// An empty candidate id is a no-op. Upstream failures are logged and
    /// read as "no committees"; they never fail the caller.
    pub async fn list_committees(&self, candidate_id: &str, cycle: i32) -> Vec<Committee> {
        if candidate_id.is_empty() {
            return Vec::new();
        }

        let url = match self.committees_url(candidate_id, cycle) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!(candidate_id, error = %e, "Cannot build committees url");
                return Vec::new();
            }
        };
        let shown = redact(&url);

        match self
            .client
            .get_json_or_empty::<ResultsEnvelope<Committee>>(url)
            .await
        {
            Ok(envelope) => {
                tracing::debug!(
                    candidate_id,
                    cycle,
                    count = envelope.results.len(),
                    "Resolved committees"
                );
                envelope.results
            }
            Err(e) => {
                tracing::warn!(candidate_id, url = %shown, error = %e, "Committee lookup failed");
                Vec::new()
            }
        }
    }
}
