//! donortrail core: shared model, aggregation primitives, configuration and errors.
//!
//! This crate has no internal donortrail dependencies and performs no I/O
//! beyond reading configuration files.
//!
//! # Modules
//!
//! - [`model`]: roster members, committees, contribution records, response entities
//! - [`totals`]: the request-scoped employer accumulator and top-N ranking
//! - [`config`]: layered configuration (defaults, TOML file, environment)
//! - [`error`]: error taxonomy and `Result` alias
//! - [`de`]: lenient deserialization helpers for upstream payloads

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod de;
pub mod error;
pub mod model;
pub mod totals;

mod proptests;

// Re-exports for convenience
pub use config::DonorConfig;
pub use error::{Error, Result};
pub use model::{
    Chamber, Committee, ContributionRecord, EmployerTotal, Member, MemberDetail, MemberFilter,
    MemberName, Party, TopN, normalize_employer,
};
pub use totals::EmployerTotals;
