//! `serve`, `member` and `members` subcommands.

use std::io::Write;

use anyhow::Context;
use donortrail_api::Server;
use donortrail_client::DonorService;
use donortrail_core::{DonorConfig, MemberFilter, TopN};

/// Runs the HTTP server until a shutdown signal arrives.
pub async fn serve(
    mut config: DonorConfig,
    host: Option<String>,
    port: Option<u16>,
) -> anyhow::Result<()> {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    tracing::info!(
        cycle = config.finance.cycle,
        concurrency = config.aggregation.committee_concurrency,
        "Starting donortrail"
    );
    Server::new(&config)?.run().await?;
    Ok(())
}

/// Prints one member's detail as pretty JSON.
pub async fn member(
    config: &DonorConfig,
    id: &str,
    count: Option<usize>,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let service = DonorService::from_config(config)?;
    let top_n = count
        .and_then(TopN::new)
        .unwrap_or_else(|| service.default_top_n());
    let detail = service
        .member_detail(id, top_n)
        .await
        .with_context(|| format!("Failed to build detail for {id}"))?;
    serde_json::to_writer_pretty(&mut *out, &detail)?;
    writeln!(out)?;
    Ok(())
}

/// Prints the filtered roster as pretty JSON.
pub async fn members(
    config: &DonorConfig,
    filter: &MemberFilter,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let service = DonorService::from_config(config)?;
    let members = service
        .members(filter)
        .await
        .context("Failed to list members")?;
    serde_json::to_writer_pretty(&mut *out, &members)?;
    writeln!(out)?;
    Ok(())
}
