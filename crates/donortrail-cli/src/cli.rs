//! Command-line argument definitions.

use clap::{Parser, Subcommand};
use donortrail_core::{Chamber, MemberFilter, Party};

/// donortrail: Congress members and their top employer donors
#[derive(Parser, Debug)]
#[command(name = "donortrail", version)]
#[command(about = "Congress member roster and employer donor aggregation", long_about = None)]
pub struct Args {
    /// Configuration file path
    #[arg(short, long, global = true, env = "DONORTRAIL_CONFIG")]
    pub config: Option<String>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP API server
    Serve {
        /// Override the configured bind host
        #[arg(long)]
        host: Option<String>,
        /// Override the configured port
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Print one member with their top employer donors as JSON
    Member {
        /// Bioguide id, e.g. A000001
        id: String,
        /// Number of donors to return
        #[arg(short = 'n', long)]
        count: Option<usize>,
    },
    /// Print the roster as JSON
    Members {
        /// Keep only this party (democrat, republican, independent)
        #[arg(long)]
        party: Option<Party>,
        /// Keep only this chamber (house, senate)
        #[arg(long)]
        chamber: Option<Chamber>,
        /// Keep only names containing this text
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Inspect or edit the configuration file
    Config {
        /// Config action
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// `config` subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the resolved config file path
    Path,
    /// Print a value by dotted key, e.g. `finance.cycle`
    Get {
        /// Dotted key
        key: String,
    },
    /// Set a value by dotted key in the config file
    Set {
        /// Dotted key
        key: String,
        /// New value
        value: String,
    },
    /// Write a default config file
    Init {
        /// Destination (defaults to the standard location)
        #[arg(long)]
        file: Option<String>,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the configuration as environment variables
    Export {
        /// Format as `--env KEY=VALUE` for `docker run`
        #[arg(long)]
        docker_env: bool,
    },
}

impl Command {
    /// Roster filter for the `members` subcommand; empty for anything else.
    pub fn member_filter(&self) -> MemberFilter {
        match self {
            Command::Members {
                party,
                chamber,
                search,
            } => MemberFilter {
                party: *party,
                chamber: *chamber,
                search: search.clone(),
            },
            _ => MemberFilter::default(),
        }
    }
}
