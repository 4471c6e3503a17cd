//! Rate-limit aware JSON fetching.
//!
//! [`FetchClient`] wraps a `reqwest::Client` that never serves cached
//! responses. A `429 Too Many Requests` is retried after the server's
//! `Retry-After` (or the policy's fallback wait) until the attempt budget is
//! spent; any other non-success status ends the call immediately. Waiting is
//! delegated to an injectable [`SleepFn`] so tests can observe backoff
//! without real time passing.

use std::sync::Arc;
use std::time::Duration;

use backon::{ConstantBuilder, Retryable};
use donortrail_core::de::null_as_default;
use donortrail_core::{DonorConfig, Error, Result};
use futures::future::BoxFuture;
use reqwest::header::{ACCEPT, CACHE_CONTROL, HeaderMap, HeaderValue, PRAGMA, RETRY_AFTER};
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;

/// Sends every outbound request with this user agent.
const USER_AGENT: &str = concat!("donortrail/", env!("CARGO_PKG_VERSION"));

/// Query parameter carrying the finance API credential.
const API_KEY_PARAM: &str = "api_key";

/// Suspends the caller for the given duration.
pub type SleepFn = Arc<dyn Fn(Duration) -> BoxFuture<'static, ()> + Send + Sync>;

/// Adapts a [`SleepFn`] to backon's `Sleeper`. A named type (rather than a
/// closure) keeps `get_json` futures provably `Send`.
struct SleeperAdapter(SleepFn);

impl backon::Sleeper for SleeperAdapter {
    type Sleep = BoxFuture<'static, ()>;

    fn sleep(&self, dur: Duration) -> Self::Sleep {
        (self.0)(dur)
    }
}

/// Sleeper backed by the tokio timer.
pub fn tokio_sleep() -> SleepFn {
    Arc::new(|wait| Box::pin(tokio::time::sleep(wait)))
}

/// How many times to try a rate-limited call and how long to wait by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts including the first; at least one is always made
    pub max_attempts: u32,
    /// Wait used when `Retry-After` is absent or unusable
    pub default_wait: Duration,
}

impl RetryPolicy {
    /// Builds the policy from configuration.
    pub fn from_config(config: &DonorConfig) -> Self {
        Self {
            max_attempts: config.retry.max_attempts.max(1),
            default_wait: config.retry_wait(),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            default_wait: Duration::from_secs(1),
        }
    }
}

/// The `{"results": [...]}` wrapper the finance API puts around every list.
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct ResultsEnvelope<T> {
    /// Listed items; `null` or missing reads as empty
    #[serde(default, deserialize_with = "null_as_default")]
    pub results: Vec<T>,
}

impl<T> Default for ResultsEnvelope<T> {
    fn default() -> Self {
        Self {
            results: Vec::new(),
        }
    }
}

/// Outcome of a single HTTP attempt.
#[derive(Debug)]
enum AttemptError {
    /// 429 with the wait the server asked for
    Throttled { wait: Duration },
    /// Anything that must not be retried
    Failed(Error),
}

/// Shared JSON client for the roster and finance sources.
#[derive(Clone)]
pub struct FetchClient {
    http: reqwest::Client,
    policy: RetryPolicy,
    sleeper: SleepFn,
}

impl FetchClient {
    /// Creates a client with no response caching and the tokio sleeper.
    pub fn new(policy: RetryPolicy) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));
        headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()
            .map_err(|e| Error::transport_with_source("Failed to build HTTP client", e))?;

        Ok(Self {
            http,
            policy,
            sleeper: tokio_sleep(),
        })
    }

    /// Replaces the sleeper used between rate-limited attempts.
    pub fn with_sleeper(mut self, sleeper: SleepFn) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// The retry policy in effect.
    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// GETs `url` and decodes the JSON body.
    ///
    /// Errors: [`Error::RateLimited`] when every attempt was throttled,
    /// [`Error::Upstream`] for other non-success statuses (not retried),
    /// [`Error::Transport`] and [`Error::Decode`] for connection and body failures.
    pub async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let retries = usize::try_from(self.policy.max_attempts.saturating_sub(1)).unwrap_or(0);
        let backoff = ConstantBuilder::default()
            .with_delay(self.policy.default_wait)
            .with_max_times(retries);
        let sleeper = Arc::clone(&self.sleeper);
        let mut attempt = 0u32;

        let outcome = (|| self.attempt::<T>(&url))
            .retry(backoff)
            .sleep(SleeperAdapter(sleeper))
            .when(|err| matches!(err, AttemptError::Throttled { .. }))
            .adjust(|err, next| match err {
                AttemptError::Throttled { wait } => next.map(|_| *wait),
                AttemptError::Failed(_) => next,
            })
            .notify(|_, wait| {
                attempt += 1;
                tracing::warn!(
                    url = %redact(&url),
                    attempt,
                    wait_ms = u64::try_from(wait.as_millis()).unwrap_or(u64::MAX),
                    "Rate limited, backing off"
                );
            })
            .await;

        match outcome {
            Ok(body) => Ok(body),
            Err(AttemptError::Failed(err)) => Err(err),
            Err(AttemptError::Throttled { .. }) => Err(Error::RateLimited {
                attempts: self.policy.max_attempts,
                url: redact(&url),
            }),
        }
    }

    /// Like [`get_json`](Self::get_json), but an exhausted rate-limit budget
    /// yields `T::default()` ("no data") instead of an error.
    pub async fn get_json_or_empty<T: DeserializeOwned + Default>(&self, url: Url) -> Result<T> {
        match self.get_json(url).await {
            Err(Error::RateLimited { attempts, url }) => {
                tracing::warn!(%url, attempts, "Retry budget exhausted, treating as empty");
                Ok(T::default())
            }
            other => other,
        }
    }

    async fn attempt<T: DeserializeOwned>(
        &self,
        url: &Url,
    ) -> std::result::Result<T, AttemptError> {
        tracing::debug!(url = %redact(url), "GET");

        let response = self.http.get(url.clone()).send().await.map_err(|e| {
            AttemptError::Failed(Error::transport_with_source(
                format!("GET {} failed", redact(url)),
                e,
            ))
        })?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let wait = retry_after(response.headers()).unwrap_or(self.policy.default_wait);
            return Err(AttemptError::Throttled { wait });
        }
        if !status.is_success() {
            return Err(AttemptError::Failed(Error::upstream(
                status.as_u16(),
                redact(url),
            )));
        }

        response.json::<T>().await.map_err(|e| {
            AttemptError::Failed(Error::decode(format!("{}: {e}", redact(url))))
        })
    }
}

impl std::fmt::Debug for FetchClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchClient")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

/// Seconds from a `Retry-After` header; `None` when absent, non-numeric or not positive.
fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    let secs = headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<f64>()
        .ok()?;
    if !secs.is_finite() || secs <= 0.0 {
        return None;
    }
    Duration::try_from_secs_f64(secs).ok()
}

/// Renders `url` with the API key masked, for logs and error messages.
pub(crate) fn redact(url: &Url) -> String {
    if !url.query_pairs().any(|(k, _)| k == API_KEY_PARAM) {
        return url.to_string();
    }
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let v = if k == API_KEY_PARAM {
                "***".to_string()
            } else {
                v.into_owned()
            };
            (k.into_owned(), v)
        })
        .collect();
    let mut shown = url.clone();
    shown.query_pairs_mut().clear().extend_pairs(pairs);
    shown.to_string()
}

/// Appends the API key query parameter.
pub(crate) fn with_api_key(mut url: Url, api_key: &str) -> Url {
    if !api_key.is_empty() {
        url.query_pairs_mut().append_pair(API_KEY_PARAM, api_key);
    }
    url
}
