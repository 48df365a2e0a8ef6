//! titlefix server entry point.
//!
//! This is the main binary that boots the MCP server on stdio transport.
//! Logging goes to stderr to avoid interfering with the JSON-RPC protocol on stdout.

use anyhow::{Context, Result};
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use titlefix_client::{TitleResolver, spawn_sweeper};
use titlefix_core::{AppConfig, CacheDb};
use tracing_subscriber::EnvFilter;

mod handler;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load().context("failed to load configuration")?;
    tracing::info!(db_path = %config.db_path.display(), parser_mode = ?config.parser_mode, "starting titlefix on stdio transport");

    let cache = CacheDb::open(&config.db_path)
        .await
        .context("failed to open title cache")?;

    let sweeper = spawn_sweeper(cache.clone(), config.retention(), config.sweep_interval());

    let resolver = TitleResolver::new(cache.clone(), &config).context("failed to build title resolver")?;
    let handler = handler::TitlefixServer::new(resolver, cache.clone(), config);

    let server = serve_server(handler, stdio()).await?;
    server.waiting().await?;

    sweeper.abort();
    if let Err(e) = cache.close().await {
        tracing::warn!(error = %e, "failed to close title cache");
    }
    Ok(())
}
