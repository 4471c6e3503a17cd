//! Bounded lazy pagination.
//!
//! [`paginate`] turns a page-fetching closure into a `Stream` of pages that
//! is pulled one page at a time and ends on the first empty page, the first
//! failed fetch, the page ceiling or an elapsed deadline, whichever comes
//! first. [`drain_into`] consumes such a stream into any `Extend` sink.

use std::future::Future;

use donortrail_core::config::AggregationConfig;
use futures::{Stream, StreamExt, stream};
use tokio::time::Instant;

/// Bounds for one paginated walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    /// Records requested per page
    pub per_page: u32,
    /// Highest page number fetched (pages are 1-based)
    pub max_pages: u32,
    /// No page is requested at or after this instant
    pub deadline: Option<Instant>,
}

impl PageLimits {
    /// Limits from aggregation settings, with an optional absolute deadline.
    pub fn from_config(config: &AggregationConfig, deadline: Option<Instant>) -> Self {
        Self {
            per_page: config.per_page,
            max_pages: config.max_pages,
            deadline,
        }
    }

    fn expired(&self) -> bool {
        self.deadline.is_some_and(|at| Instant::now() >= at)
    }
}

impl Default for PageLimits {
    fn default() -> Self {
        Self::from_config(&AggregationConfig::default(), None)
    }
}

/// One non-empty page of records.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    /// 1-based page number
    pub number: u32,
    /// Records on this page; never empty
    pub records: Vec<T>,
}

/// What a drained stream delivered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageSummary {
    /// Pages consumed
    pub pages: u32,
    /// Records across those pages
    pub records: usize,
}

/// Lazily walks pages `1..=limits.max_pages`.
///
/// `fetch` receives the page number and yields `Some(records)`, or `None`
/// when the request failed. Page `n + 1` is only requested after page `n`
/// came back non-empty.
pub fn paginate<T, F, Fut>(limits: PageLimits, fetch: F) -> impl Stream<Item = Page<T>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Option<Vec<T>>>,
{
    stream::unfold((1u32, fetch), move |(number, mut fetch)| async move {
        if number > limits.max_pages {
            tracing::debug!(max_pages = limits.max_pages, "Page ceiling reached");
            return None;
        }
        if limits.expired() {
            tracing::debug!(page = number, "Deadline passed, not requesting further pages");
            return None;
        }

        let records = fetch(number).await?;
        if records.is_empty() {
            return None;
        }
        Some((Page { number, records }, (number + 1, fetch)))
    })
}

/// Feeds every record of `pages` into `sink`.
pub async fn drain_into<T, S, E>(pages: S, sink: &mut E) -> PageSummary
where
    S: Stream<Item = Page<T>>,
    E: Extend<T>,
{
    let mut pages = std::pin::pin!(pages);
    let mut summary = PageSummary::default();
    while let Some(page) = pages.next().await {
        summary.pages += 1;
        summary.records += page.records.len();
        sink.extend(page.records);
    }
    summary
}
