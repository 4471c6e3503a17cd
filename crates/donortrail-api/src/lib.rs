//! # donortrail-api
//!
//! HTTP API server for donortrail.
//!
//! Routes:
//! - `GET /healthz`: liveness
//! - `GET /members?party=&chamber=&search=`: filtered roster listing
//! - `GET /members/{id}`: one member's identity
//! - `GET /member-detail/{id}?count=N`: identity plus top-N employer donors

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod error;
pub mod routes;
pub mod server;

pub use error::{Error, Result};
pub use routes::{AppState, router};
pub use server::Server;
