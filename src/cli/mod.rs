//! CLI adapter for kmgr
//!
//! Provides command-line access to the knowledge pack operations.
//! This module is parallel to `mcp/` and `http/` - all of them depend on
//! `core/` but not on each other.
//!
//! # Architecture
//!
//! ```text
//!                    +------------------+
//!                    |      core/       |
//!                    |  (domain logic)  |
//!                    +--------+---------+
//!                             |
//!          +------------------+------------------+
//!          |                  |                  |
//!          v                  v                  v
//! +----------------+ +----------------+ +----------------+
//! |     http/      | |      mcp/      | |      cli/      |
//! | (axum adapter) | |(stdio adapter) | | (clap adapter) |
//! +----------------+ +----------------+ +----------------+
//! ```

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};

/// kmgr - knowledge pack manager
///
/// Snapshot a repository into a compact pack, keep a chat log beside it
/// and export the parts relevant to a query as a bounded context payload.
#[derive(Parser, Debug)]
#[command(name = "kmgr")]
#[command(version)]
#[command(about = "Knowledge pack manager for local coding agents", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(long, global = true, default_value = "human")]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output (default)
    #[default]
    Human,
    /// JSON output for scripting
    Json,
}

/// Available CLI commands
///
/// Command names match MCP tool names (underscores become hyphens).
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Register a repository directory under an alias
    #[command(name = "set-repo-alias")]
    SetRepoAlias(commands::SetAliasArgs),

    /// Snapshot a repository into its pack
    #[command(name = "build-pack")]
    BuildPack(commands::BuildArgs),

    /// Append one chat record to a pack
    #[command(name = "append-chat")]
    AppendChat(commands::AppendArgs),

    /// Export query-relevant context from a pack
    #[command(name = "export-context")]
    ExportContext(commands::ExportArgs),

    /// Show current configuration
    #[command(name = "show-config")]
    ShowConfig(commands::ConfigArgs),

    /// Generate shell completion scripts
    ///
    /// Output completion script to stdout. To install:
    ///
    ///   bash:  kmgr completions bash > ~/.local/share/bash-completion/completions/kmgr
    ///   zsh:   kmgr completions zsh > ~/.zfunc/_kmgr
    ///   fish:  kmgr completions fish > ~/.config/fish/completions/kmgr.fish
    Completions(commands::CompletionsArgs),
}

/// Run the CLI with the provided arguments
pub async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    use crate::core::config::Config;
    use crate::core::services::Services;
    use crate::core::xdg::XdgDirs;
    use std::sync::Arc;

    // Completions don't need services
    if let Commands::Completions(args) = cli.command {
        return commands::completions::execute(args);
    }

    let xdg = XdgDirs::new();
    xdg.ensure_dirs_exist()?;

    let config = Config::load()?;
    let services = Arc::new(Services::new(config));

    match cli.command {
        Commands::SetRepoAlias(args) => {
            commands::pack::execute_set_alias(args, &services, cli.format).await
        }
        Commands::BuildPack(args) => commands::pack::execute_build(args, &services, cli.format).await,
        Commands::AppendChat(args) => {
            commands::pack::execute_append(args, &services, cli.format).await
        }
        Commands::ExportContext(args) => {
            commands::pack::execute_export(args, &services, cli.format).await
        }
        Commands::ShowConfig(args) => commands::config::execute(args, &services, cli.format).await,
        Commands::Completions(_) => unreachable!(), // Handled above
    }
}
