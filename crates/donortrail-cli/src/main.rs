//! donortrail CLI
//!
//! Congress member roster and employer donor aggregation.

#![warn(clippy::all)]
#![forbid(unsafe_code)]

use anyhow::Result;
use clap::Parser;
use donortrail_cli::config_handlers::handle_config_command;
use donortrail_cli::{Args, Command, commands, logging};
use donortrail_core::DonorConfig;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    logging::init_tracing();

    let config_path = args.config.as_deref();
    let mut stdout = std::io::stdout();

    match args.command {
        Command::Config { action } => {
            handle_config_command(config_path, action, &mut stdout)?;
        }
        Command::Serve { host, port } => {
            let config = DonorConfig::load(config_path)?;
            commands::serve(config, host, port).await?;
        }
        Command::Member { ref id, count } => {
            let config = DonorConfig::load(config_path)?;
            commands::member(&config, id, count, &mut stdout).await?;
        }
        ref members @ Command::Members { .. } => {
            let config = DonorConfig::load(config_path)?;
            commands::members(&config, &members.member_filter(), &mut stdout).await?;
        }
    }
    Ok(())
}
