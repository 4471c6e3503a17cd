//! donortrail client: upstream access and the donor-aggregation pipeline.
//!
//! ```text
//! member id ─► RosterResolver ─► candidate id ─► CommitteeResolver
//!                                                     │
//!                                        committees ◄─┘
//!                                             │
//!                    ContributionAggregator ◄─┘  (committees × pages)
//!                             │
//!                             ▼
//!                   ranked top-N EmployerTotal
//! ```
//!
//! All upstream calls go through [`FetchClient`], which retries rate-limited
//! responses and disables response caching.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod aggregate;
pub mod committees;
pub mod fetch;
pub mod paging;
pub mod pipeline;
pub mod roster;

pub use aggregate::ContributionAggregator;
pub use committees::CommitteeResolver;
pub use fetch::{FetchClient, ResultsEnvelope, RetryPolicy, SleepFn, tokio_sleep};
pub use paging::{Page, PageLimits, PageSummary, drain_into, paginate};
pub use pipeline::DonorService;
pub use roster::{RosterEntry, RosterResolver};

// Re-export core types
pub use donortrail_core::{Error, Result};

