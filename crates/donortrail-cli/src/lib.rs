//! # donortrail-cli
//!
//! Command-line front end for donortrail: runs the API server, queries
//! members and donors once from the terminal and manages the config file.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod cli;
pub mod commands;
pub mod config_handlers;
pub mod logging;

pub use cli::{Args, Command, ConfigAction};
