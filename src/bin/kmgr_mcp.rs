//! kmgr MCP (Model Context Protocol) server
//!
//! A stdio-based MCP server that exposes the knowledge pack operations
//! as tools for MCP clients.

use kmgr::core::config::Config;
use kmgr::core::services::Services;
use kmgr::core::xdg::XdgDirs;
use kmgr::mcp::McpServer;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn init_logging() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr) // stdout carries the protocol
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "kmgr=info".into()),
        )
        .with_ansi(false)
        .compact()
        .init();
}

#[tokio::main]
async fn main() {
    init_logging();

    let xdg = XdgDirs::new();
    if let Err(e) = xdg.ensure_dirs_exist() {
        eprintln!("Failed to create XDG directories: {e}");
        std::process::exit(1);
    }

    let config = Config::load().unwrap_or_else(|e| {
        eprintln!("Failed to load configuration: {e}");
        std::process::exit(1);
    });
    tracing::info!(
        "Packs root: {:?}, default repo: {:?}",
        config.packs.root_dir,
        config.packs.default_repo
    );

    let services = Arc::new(Services::new(config));
    let mut server = McpServer::new(services);

    if let Err(e) = server.run().await {
        eprintln!("MCP server error: {e}");
        std::process::exit(1);
    }
}
