//! Pack commands - alias registration, build, append and export

use crate::cli::output::print_outcome;
use crate::cli::OutputFormat;
use crate::core::pack::{AppendRequest, BuildRequest, ExportRequest};
use crate::core::services::Services;
use crate::core::types::PackOutcome;
use clap::Args;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

/// Arguments for the set-repo-alias command
#[derive(Args, Debug)]
pub struct SetAliasArgs {
    /// Alias name (letters, digits, '.', '_' or '-')
    pub alias: String,

    /// Repository directory
    pub path: PathBuf,

    /// Also make this alias the default repository
    #[arg(long)]
    pub default: bool,
}

/// Arguments for the build-pack command
#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Repository alias or directory (falls back to the configured default)
    #[arg(long, short = 'r')]
    pub repo: Option<String>,

    /// Archive size ceiling in MB
    #[arg(long)]
    pub max_pack_mb: Option<u64>,

    /// File name glob to include (repeatable, replaces the configured list)
    #[arg(long = "include", value_name = "GLOB")]
    pub include: Vec<String>,

    /// Directory name to skip (repeatable, replaces the configured list)
    #[arg(long = "exclude-dir", value_name = "NAME")]
    pub exclude_dirs: Vec<String>,
}

/// Arguments for the append-chat command
#[derive(Args, Debug)]
pub struct AppendArgs {
    /// Record role: system, user, assistant or tool
    #[arg(long)]
    pub role: String,

    /// Record content
    #[arg(required_unless_present = "content_file")]
    pub content: Option<String>,

    /// Read the record content from a file
    #[arg(long, conflicts_with = "content")]
    pub content_file: Option<PathBuf>,

    /// Repository alias or directory
    #[arg(long, short = 'r')]
    pub repo: Option<String>,

    /// Append even when an identical record already exists
    #[arg(long)]
    pub no_dedup: bool,
}

/// Arguments for the export-context command
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Case-insensitive text to look for
    pub query: String,

    /// Repository alias or directory
    #[arg(long, short = 'r')]
    pub repo: Option<String>,

    /// Payload budget in bytes (1024 to 10485760)
    #[arg(long)]
    pub max_bytes: Option<usize>,

    /// Destination file (defaults to scratch/context_payload.txt)
    #[arg(long, short = 'o')]
    pub out_file: Option<PathBuf>,
}

impl From<BuildArgs> for BuildRequest {
    fn from(args: BuildArgs) -> Self {
        Self {
            repo: args.repo,
            max_pack_mb: args.max_pack_mb,
            include: non_empty(args.include),
            exclude_dirs: non_empty(args.exclude_dirs),
        }
    }
}

impl From<ExportArgs> for ExportRequest {
    fn from(args: ExportArgs) -> Self {
        Self {
            query: args.query,
            repo: args.repo,
            max_bytes: args.max_bytes,
            out_file: args.out_file,
        }
    }
}

impl AppendArgs {
    /// Turn the arguments into a request, reading `--content-file` if given
    pub fn into_request(self) -> Result<AppendRequest, Box<dyn std::error::Error>> {
        let content = match (self.content, self.content_file) {
            (Some(content), _) => content,
            (None, Some(path)) => fs::read_to_string(&path)
                .map_err(|e| format!("Failed to read {}: {e}", path.display()))?,
            (None, None) => return Err("content or --content-file is required".into()),
        };

        Ok(AppendRequest {
            role: self.role,
            content,
            repo: self.repo,
            dedup: !self.no_dedup,
        })
    }
}

fn non_empty(values: Vec<String>) -> Option<Vec<String>> {
    if values.is_empty() {
        None
    } else {
        Some(values)
    }
}

/// Execute the set-repo-alias command
pub async fn execute_set_alias(
    args: SetAliasArgs,
    services: &Arc<Services>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let outcome = run_blocking(services, move |s| {
        s.packs.set_repo_alias(&args.alias, &args.path, args.default)
    })
    .await?;
    finish(&outcome, format)
}

/// Execute the build-pack command
pub async fn execute_build(
    args: BuildArgs,
    services: &Arc<Services>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let request = BuildRequest::from(args);
    let outcome = run_blocking(services, move |s| s.packs.build(&request)).await?;
    finish(&outcome, format)
}

/// Execute the append-chat command
pub async fn execute_append(
    args: AppendArgs,
    services: &Arc<Services>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let request = args.into_request()?;
    let outcome = run_blocking(services, move |s| s.packs.append(&request)).await?;
    finish(&outcome, format)
}

/// Execute the export-context command
pub async fn execute_export(
    args: ExportArgs,
    services: &Arc<Services>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let request = ExportRequest::from(args);
    let outcome = run_blocking(services, move |s| s.packs.export(&request)).await?;
    finish(&outcome, format)
}

async fn run_blocking<F>(
    services: &Arc<Services>,
    op: F,
) -> Result<PackOutcome, Box<dyn std::error::Error>>
where
    F: FnOnce(&Services) -> PackOutcome + Send + 'static,
{
    let services = Arc::clone(services);
    let outcome = tokio::task::spawn_blocking(move || op(&services))
        .await
        .map_err(|e| format!("Pack task failed: {e}"))?;
    Ok(outcome)
}

/// Print the envelope; a failed operation becomes the command's error
fn finish(outcome: &PackOutcome, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    print_outcome(outcome, format);
    if outcome.ok {
        Ok(())
    } else {
        Err(format!("{} failed: {}", outcome.step, outcome.summary).into())
    }
}
