//! Layered configuration: defaults, then an optional TOML file, then
//! `DONORTRAIL_*` environment variables.
//!
//! The defaults reproduce the reference behavior: cycle 2024, three
//! attempts per upstream call with a one-second fallback wait, 100 records
//! per page, five pages per committee, top three donors, committees walked
//! one at a time and no overall deadline.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::model::TopN;
use crate::{Error, Result};

/// Project name used for the config directory.
pub const PROJECT_NAME: &str = "donortrail";

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "DONORTRAIL";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DonorConfig {
    /// HTTP listener
    pub server: ServerConfig,
    /// Legislator roster source
    pub roster: RosterConfig,
    /// Campaign-finance API
    pub finance: FinanceConfig,
    /// Rate-limit retry policy
    pub retry: RetryConfig,
    /// Contribution aggregation bounds
    pub aggregation: AggregationConfig,
}

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind host
    pub host: String,
    /// Bind port
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

/// Roster source settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RosterConfig {
    /// URL of the legislator roster JSON
    pub url: String,
    /// Base URL portraits are served from (`{base}/{bioguide}.jpg`)
    pub photo_base_url: String,
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            url: "https://unitedstates.github.io/congress-legislators/legislators-current.json"
                .to_string(),
            photo_base_url: "https://unitedstates.github.io/images/congress/450x550".to_string(),
        }
    }
}

/// Campaign-finance API settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinanceConfig {
    /// API root; committees live under `{base_url}/candidate/{id}/committees/`
    pub base_url: String,
    /// Contribution-schedule (by employer) endpoint
    pub schedule_url: String,
    /// API key sent as the `api_key` query parameter
    pub api_key: String,
    /// Target election cycle
    pub cycle: i32,
}

impl Default for FinanceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.open.fec.gov/v1".to_string(),
            schedule_url: "https://api.open.fec.gov/v1/schedules/schedule_a/by_employer/"
                .to_string(),
            api_key: "DEMO_KEY".to_string(),
            cycle: 2024,
        }
    }
}

/// Rate-limit retry policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Attempts per call, including the first
    pub max_attempts: u32,
    /// Wait when a 429 carries no usable `Retry-After`
    pub default_wait_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            default_wait_secs: 1,
        }
    }
}

/// Contribution aggregation bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregationConfig {
    /// Records requested per page
    pub per_page: u32,
    /// Page ceiling per committee
    pub max_pages: u32,
    /// Donor count when the caller gives none
    pub default_top_n: usize,
    /// Committees walked at the same time
    pub committee_concurrency: usize,
    /// Overall budget for one aggregation; unset means none
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline_secs: Option<u64>,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            per_page: 100,
            max_pages: 5,
            default_top_n: 3,
            committee_concurrency: 1,
            deadline_secs: None,
        }
    }
}

impl AggregationConfig {
    /// Overall aggregation budget, if configured.
    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_secs.map(Duration::from_secs)
    }
}

impl DonorConfig {
    /// Loads configuration from `config_path` (or the default location),
    /// then applies environment overrides and validates the result.
    ///
    /// An explicit path must exist; a missing default file means defaults.
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut config = match config_path {
            Some(explicit) => Self::from_file(Path::new(explicit))?,
            None => match Self::default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => Self::default(),
            },
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("Failed to read {}: {e}", path.display()))
        })?;
        tracing::debug!(path = %path.display(), "Loaded configuration file");
        Self::from_toml_str(&content)
            .map_err(|e| Error::config(format!("Failed to parse {}: {e}", path.display())))
    }

    /// Parses TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::config(e.to_string()))
    }

    /// Serializes to pretty TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::config(e.to_string()))
    }

    /// Explicit path if given, else the default location.
    pub fn resolve_config_path(explicit: Option<&str>) -> Option<PathBuf> {
        match explicit {
            Some(path) => Some(PathBuf::from(path)),
            None => Self::default_config_path(),
        }
    }

    /// `<config dir>/donortrail/config.toml`.
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(PROJECT_NAME).join("config.toml"))
    }

    /// Applies `DONORTRAIL_*` overrides using `lookup` to read variables.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(&format!("{ENV_PREFIX}_{name}"));

        if let Some(v) = var("HOST") {
            self.server.host = v;
        }
        if let Some(v) = var("PORT") {
            self.server.port = parse_env("PORT", &v)?;
        }
        if let Some(v) = var("ROSTER_URL") {
            self.roster.url = v;
        }
        if let Some(v) = var("PHOTO_BASE_URL") {
            self.roster.photo_base_url = v;
        }
        if let Some(v) = var("FINANCE_BASE_URL") {
            self.finance.base_url = v;
        }
        if let Some(v) = var("SCHEDULE_URL") {
            self.finance.schedule_url = v;
        }
        if let Some(v) = var("API_KEY") {
            self.finance.api_key = v;
        }
        if let Some(v) = var("CYCLE") {
            self.finance.cycle = parse_env("CYCLE", &v)?;
        }
        Ok(())
    }

    /// Rejects settings that would make aggregation meaningless.
    pub fn validate(&self) -> Result<()> {
        if self.retry.max_attempts == 0 {
            return Err(Error::config("retry.max_attempts must be at least 1"));
        }
        if self.aggregation.per_page == 0 {
            return Err(Error::config("aggregation.per_page must be at least 1"));
        }
        if self.aggregation.max_pages == 0 {
            return Err(Error::config("aggregation.max_pages must be at least 1"));
        }
        if self.aggregation.default_top_n == 0 {
            return Err(Error::config("aggregation.default_top_n must be at least 1"));
        }
        if self.aggregation.committee_concurrency == 0 {
            return Err(Error::config(
                "aggregation.committee_concurrency must be at least 1",
            ));
        }
        Ok(())
    }

    /// Exports the settings the environment can override, as `(name, value)` pairs.
    pub fn to_env_vars(&self) -> Vec<(String, String)> {
        [
            ("HOST", self.server.host.clone()),
            ("PORT", self.server.port.to_string()),
            ("ROSTER_URL", self.roster.url.clone()),
            ("PHOTO_BASE_URL", self.roster.photo_base_url.clone()),
            ("FINANCE_BASE_URL", self.finance.base_url.clone()),
            ("SCHEDULE_URL", self.finance.schedule_url.clone()),
            ("API_KEY", self.finance.api_key.clone()),
            ("CYCLE", self.finance.cycle.to_string()),
        ]
        .into_iter()
        .map(|(name, value)| (format!("{ENV_PREFIX}_{name}"), value))
        .collect()
    }

    /// `host:port` for the listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Donor count used when the caller gives none.
    pub fn default_top_n(&self) -> TopN {
        TopN::new(self.aggregation.default_top_n).unwrap_or_default()
    }

    /// Fallback wait between rate-limited attempts.
    pub fn retry_wait(&self) -> Duration {
        Duration::from_secs(self.retry.default_wait_secs)
    }

    /// Overall aggregation budget, if configured.
    pub fn aggregation_deadline(&self) -> Option<Duration> {
        self.aggregation.deadline()
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        Error::config(format!(
            "{ENV_PREFIX}_{name} has an invalid value: {value:?}"
        ))
    })
}
