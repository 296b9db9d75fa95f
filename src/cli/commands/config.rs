//! Config command - show current configuration

use crate::cli::output::{colors, print_header};
use crate::cli::OutputFormat;
use crate::core::config::{FilesConfig, PacksConfig};
use crate::core::services::Services;
use crate::core::xdg::XdgDirs;
use clap::Args;
use serde::Serialize;
use std::sync::Arc;

/// Arguments for the config command
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Also show the file access service settings
    #[arg(long, short = 'a')]
    pub all: bool,
}

/// Configuration response
#[derive(Debug, Serialize)]
pub struct ConfigResponse {
    pub config_file: String,
    pub packs_dir: String,
    pub packs: PacksConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub files: Option<FilesConfig>,
}

/// Execute the config command
pub async fn execute(
    args: ConfigArgs,
    services: &Arc<Services>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = &services.config;
    let xdg = XdgDirs::new();

    let response = ConfigResponse {
        config_file: xdg.config_file().to_string_lossy().into_owned(),
        packs_dir: services.packs.packs_dir().to_string_lossy().into_owned(),
        packs: config.packs.clone(),
        files: args.all.then(|| config.files.clone()),
    };

    match format {
        OutputFormat::Human => print_human(&response),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&response)?),
    }

    Ok(())
}

fn print_human(response: &ConfigResponse) {
    let packs = &response.packs;

    print_header("Configuration:");
    println!("  config_file: {}", colors::file_path(&response.config_file));
    println!("  packs_dir: {}", colors::file_path(&response.packs_dir));
    println!("  packs:");
    println!("    root_dir: {}", packs.root_dir.display());
    println!(
        "    default_repo: {}",
        packs.default_repo.as_deref().unwrap_or("(none)")
    );
    println!("    max_pack_mb: {}", packs.max_pack_mb);
    println!("    max_content_bytes: {}", packs.max_content_bytes);
    println!("    default_export_bytes: {}", packs.default_export_bytes);
    println!(
        "    retry: {} attempts, {} ms apart",
        packs.retry_attempts, packs.retry_delay_ms
    );
    println!("    include_patterns: {:?}", packs.include_patterns);
    println!("    exclude_dirs: {:?}", packs.exclude_dirs);

    if let Some(files) = &response.files {
        println!("  files:");
        println!("    listen: {}:{}", files.host, files.port);
        println!("    roots: {:?}", files.roots);
        println!("    working_dir: {}", files.working_dir.display());
        println!("    max_chunk_bytes: {}", files.max_chunk_bytes);
        println!("    max_lines: {}", files.max_lines);
        println!("    max_search_bytes: {}", files.max_search_bytes);
        println!("    max_search_results: {}", files.max_search_results);
        println!("    default_encoding: {}", files.default_encoding);
    }
}
