mod config;
mod errors;
mod logging;
mod mcp;
mod notion;
mod security;
mod server;
mod tools;


use crate::config::{Config, Transport};
use crate::mcp::registry::ToolRegistry;
use crate::notion::NotionClient;
use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "notion-mcp", version, about = "MCP server for Notion search, pages and databases")]
struct Cli {
    /// TOML configuration file
    #[arg(long, env = "NOTION_MCP_CONFIG")]
    config: Option<PathBuf>,
    /// Overrides `server.transport`
    #[arg(long, value_enum)]
    transport: Option<Transport>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    logging::init();
    let cli = Cli::parse();

    let mut cfg = Config::load(cli.config.as_deref()).context("loading config")?;
    cfg.apply_env(|key| std::env::var(key).ok());
    if let Some(transport) = cli.transport {
        cfg.server.transport = transport;
    }
    cfg.validate().context("validating config")?;

    let service = NotionClient::new(&cfg.notion).context("building notion client")?;
    let registry = ToolRegistry::notion(Arc::new(service));

    info!(
        name = %cfg.server.name,
        version = %cfg.server.version,
        transport = ?cfg.server.transport,
        tools = ?registry.list_names(),
        "notion-mcp ready"
    );

    server::serve(cfg, registry).await
}
