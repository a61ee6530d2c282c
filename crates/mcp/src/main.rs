//! Proposer MCP Server Binary
//!
//! ## Usage
//!
//! ```bash
//! # Run with the default database (sqlite://proposer.db)
//! proposer-mcp
//!
//! # Run with a specific database and JSON logs
//! PROPOSER_DATABASE_URL=sqlite://sales.db PROPOSER_LOG_FORMAT=json proposer-mcp
//! ```
//!
//! stdout carries the MCP transport; logs always go to stderr.

use anyhow::Result;
use proposer_core::config::{AppConfig, LoadOptions, LogFormat};
use proposer_db::open_store;
use proposer_mcp::{ProposerMcpServer, SalesDesk};
use rmcp::{transport::stdio, ServiceExt};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_logging(config: &AppConfig) {
    let filter = EnvFilter::try_new(&config.logging.level).unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    match config.logging.format {
        LogFormat::Compact => builder.compact().init(),
        LogFormat::Pretty => builder.pretty().init(),
        LogFormat::Json => builder.json().init(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load(LoadOptions::default())?;
    init_logging(&config);

    info!(
        event_name = "mcp.server.starting",
        correlation_id = "bootstrap",
        database_url = %config.database.url,
        catalog = %config.catalog.default,
        "starting proposer MCP server"
    );

    let pool = open_store(&config.database).await?;
    let desk = SalesDesk::from_pool(pool.clone(), &config)?;

    let service = ProposerMcpServer::new(desk).serve(stdio()).await?;
    info!(event_name = "mcp.server.started", correlation_id = "bootstrap", "serving on stdio");

    service.waiting().await?;
    pool.close().await;
    info!(event_name = "mcp.server.stopped", correlation_id = "shutdown", "MCP server shut down");

    Ok(())
}
