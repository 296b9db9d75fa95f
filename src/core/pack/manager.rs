//! Knowledge pack operations.
//!
//! Every public operation returns a [`PackOutcome`]; errors are never
//! raised to the caller. The outcome's `step` names the stage that
//! failed (`set_alias`, `resolve_repo`, `validate`, `build`, `append`,
//! `export`).
//!
//! Operations on the same alias are not serialized; callers are
//! expected to issue one operation at a time per alias.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;

use super::archive::{self, PackReader, Snapshot};
use super::export;
use super::registry::{RepoRegistry, ResolvedRepo};
use super::retry::RetryPolicy;
use super::walker::RepoWalker;
use crate::core::config::{PacksConfig, MAX_EXPORT_BYTES, MIN_EXPORT_BYTES};
use crate::core::error::{KmgrError, Result};
use crate::core::types::{ChatRecord, ChatRole, PackOutcome};

const PACK_EXTENSION: &str = "kpkg";
const DEFAULT_EXPORT_FILE: &str = "context_payload.txt";

/// Arguments for [`PackManager::build`]
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BuildRequest {
    #[serde(default)]
    pub repo: Option<String>,
    #[serde(default)]
    pub max_pack_mb: Option<u64>,
    #[serde(default)]
    pub include: Option<Vec<String>>,
    #[serde(default)]
    pub exclude_dirs: Option<Vec<String>>,
}

/// Arguments for [`PackManager::append`]
#[derive(Debug, Clone, Deserialize)]
pub struct AppendRequest {
    pub role: String,
    pub content: String,
    #[serde(default)]
    pub repo: Option<String>,
    #[serde(default = "default_dedup")]
    pub dedup: bool,
}

fn default_dedup() -> bool {
    true
}

/// Arguments for [`PackManager::export`]
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExportRequest {
    pub query: String,
    #[serde(default)]
    pub repo: Option<String>,
    #[serde(default)]
    pub max_bytes: Option<usize>,
    #[serde(default)]
    pub out_file: Option<PathBuf>,
}

/// Failure tagged with the step it happened in
struct StepFailure {
    step: &'static str,
    error: KmgrError,
}

type StepResult<T> = std::result::Result<T, StepFailure>;

trait AtStep<T> {
    fn at(self, step: &'static str) -> StepResult<T>;
}

impl<T> AtStep<T> for Result<T> {
    fn at(self, step: &'static str) -> StepResult<T> {
        self.map_err(|error| StepFailure { step, error })
    }
}

#[derive(Debug)]
struct Built {
    pack: PathBuf,
    size_bytes: u64,
    files: usize,
}

/// Owns the packs directory, the scratch directory and the alias registry
#[derive(Debug, Clone)]
pub struct PackManager {
    packs_dir: PathBuf,
    scratch_dir: PathBuf,
    registry: RepoRegistry,
    config: PacksConfig,
    retry: RetryPolicy,
}

impl PackManager {
    pub fn new(config: &PacksConfig) -> Self {
        Self {
            packs_dir: config.root_dir.join("packs"),
            scratch_dir: config.root_dir.join("scratch"),
            registry: RepoRegistry::new(config.root_dir.join("repos.json")),
            config: config.clone(),
            retry: RetryPolicy::new(config.retry_attempts, config.retry_delay_ms),
        }
    }

    pub fn packs_dir(&self) -> &Path {
        &self.packs_dir
    }

    pub fn registry(&self) -> &RepoRegistry {
        &self.registry
    }

    /// Location of the pack for `alias`
    pub fn pack_path(&self, alias: &str) -> PathBuf {
        self.packs_dir.join(format!("{alias}.{PACK_EXTENSION}"))
    }

    /// Default export destination
    pub fn default_export_path(&self) -> PathBuf {
        self.scratch_dir.join(DEFAULT_EXPORT_FILE)
    }

    /// Register `alias` for `path`, optionally as the default
    pub fn set_repo_alias(&self, alias: &str, path: &Path, make_default: bool) -> PackOutcome {
        let result = self.registry.set_alias(alias, path, make_default).map(|registry| {
            let stored = registry.aliases.get(alias).cloned().unwrap_or_default();
            tracing::info!(alias, path = %stored.display(), make_default, "Alias registered");
            PackOutcome::success(
                "set_alias",
                format!("Alias '{alias}' -> {}", stored.display()),
                json!({
                    "alias": alias,
                    "path": stored,
                    "default": registry.default,
                }),
            )
        });
        settle(result.at("set_alias"))
    }

    /// Build (or fully replace) the pack for a repository
    pub fn build(&self, req: &BuildRequest) -> PackOutcome {
        settle(self.try_build(req))
    }

    /// Append one chat record to a repository's pack
    pub fn append(&self, req: &AppendRequest) -> PackOutcome {
        settle(self.try_append(req))
    }

    /// Export a relevance-filtered payload from a repository's pack
    pub fn export(&self, req: &ExportRequest) -> PackOutcome {
        settle(self.try_export(req))
    }

    fn resolve(&self, repo: Option<&str>) -> StepResult<ResolvedRepo> {
        self.registry
            .resolve(repo, self.config.default_repo.as_deref())
            .at("resolve_repo")
    }

    fn try_build(&self, req: &BuildRequest) -> StepResult<PackOutcome> {
        let repo = self.resolve(req.repo.as_deref())?;

        let max_pack_mb = req.max_pack_mb.unwrap_or(self.config.max_pack_mb);
        if max_pack_mb == 0 {
            return Err(KmgrError::BadRequest("max_pack_mb must be positive".into())).at("validate");
        }
        let include = req.include.as_ref().unwrap_or(&self.config.include_patterns);
        let exclude = req.exclude_dirs.as_ref().unwrap_or(&self.config.exclude_dirs);
        let walker = RepoWalker::new(include, exclude).at("validate")?;

        let built = self.build_pack(&repo, &walker, max_pack_mb).at("build")?;
        Ok(PackOutcome::success(
            "build",
            format!(
                "Built pack for '{}': {} files, {} bytes",
                repo.alias, built.files, built.size_bytes
            ),
            json!({
                "pack": built.pack,
                "alias": repo.alias,
                "repo": repo.path,
                "size_bytes": built.size_bytes,
                "files": built.files,
            }),
        ))
    }

    /// Build with configured defaults when no pack exists yet
    fn ensure_pack(&self, repo: &ResolvedRepo) -> StepResult<PathBuf> {
        let pack = self.pack_path(&repo.alias);
        if pack.exists() {
            return Ok(pack);
        }
        tracing::info!(alias = %repo.alias, "No pack yet, building");
        let walker = RepoWalker::new(&self.config.include_patterns, &self.config.exclude_dirs)
            .at("validate")?;
        self.build_pack(repo, &walker, self.config.max_pack_mb)
            .map(|built| built.pack)
            .at("build")
    }

    fn build_pack(&self, repo: &ResolvedRepo, walker: &RepoWalker, max_pack_mb: u64) -> Result<Built> {
        let pack = self.pack_path(&repo.alias);
        let ceiling = max_pack_mb.saturating_mul(1024 * 1024);

        self.retry.run("build", || {
            let files = walker.collect_files(&repo.path);
            let snapshot = Snapshot::collect(&repo.path, &files);
            if snapshot.is_empty() {
                return Err(KmgrError::NotCreated(format!(
                    "No files under {} matched the include patterns",
                    repo.path.display()
                )));
            }

            fs::create_dir_all(&self.packs_dir)?;
            let tmp = NamedTempFile::new_in(&self.packs_dir)?;
            archive::write_pack(tmp.as_file(), &repo.path, &snapshot)?;
            let size_bytes = tmp.as_file().metadata()?.len();
            if size_bytes > ceiling {
                return Err(KmgrError::TooLarge(format!(
                    "Pack would be {size_bytes} bytes, limit is {max_pack_mb} MB"
                )));
            }
            tmp.persist(&pack).map_err(|e| KmgrError::Io(e.error))?;

            tracing::info!(
                alias = %repo.alias,
                files = snapshot.index.len(),
                size_bytes,
                "Pack built"
            );
            Ok(Built {
                pack: pack.clone(),
                size_bytes,
                files: snapshot.index.len(),
            })
        })
    }

    fn try_append(&self, req: &AppendRequest) -> StepResult<PackOutcome> {
        let role: ChatRole = req.role.parse().at("validate")?;
        if req.content.is_empty() {
            return Err(KmgrError::BadRequest("content cannot be empty".into())).at("validate");
        }
        if req.content.len() > self.config.max_content_bytes {
            return Err(KmgrError::TooLarge(format!(
                "content is {} bytes, limit is {}",
                req.content.len(),
                self.config.max_content_bytes
            )))
            .at("validate");
        }

        let repo = self.resolve(req.repo.as_deref())?;
        let pack = self.ensure_pack(&repo)?;

        let cksum = hex::encode(Sha256::digest(req.content.as_bytes()));
        let before = file_size(&pack).at("append")?;

        let appended = self
            .retry
            .run("append", || {
                let log = PackReader::open(&pack)?.chat_log()?;
                if req.dedup && archive::parse_chat(&log).iter().any(|r| r.cksum == cksum) {
                    return Ok(false);
                }

                let record = ChatRecord {
                    ts: Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string(),
                    role,
                    content: req.content.clone(),
                    cksum: cksum.clone(),
                };
                let mut chat = log.into_bytes();
                if !chat.is_empty() && !chat.ends_with(b"\n") {
                    chat.push(b'\n');
                }
                serde_json::to_writer(&mut chat, &record)?;
                chat.push(b'\n');
                archive::replace_chat(&pack, &chat)?;
                Ok(true)
            })
            .at("append")?;

        let after = file_size(&pack).at("append")?;

        if !appended {
            tracing::info!(alias = %repo.alias, %role, "Duplicate content, append skipped");
            return Ok(PackOutcome::success(
                "append",
                "Duplicate content, nothing appended (no growth)",
                json!({
                    "pack": pack,
                    "delta_bytes": 0,
                    "size_bytes": after,
                    "deduplicated": true,
                }),
            ));
        }

        if after <= before {
            return Err(KmgrError::Internal(format!(
                "Pack did not grow after append ({before} -> {after} bytes)"
            )))
            .at("append");
        }

        let delta = after - before;
        tracing::info!(alias = %repo.alias, %role, delta_bytes = delta, "Chat record appended");
        Ok(PackOutcome::success(
            "append",
            format!("Appended {role} record, pack grew by {delta} bytes"),
            json!({
                "pack": pack,
                "delta_bytes": delta,
                "size_bytes": after,
                "deduplicated": false,
            }),
        ))
    }

    fn try_export(&self, req: &ExportRequest) -> StepResult<PackOutcome> {
        let query = req.query.trim();
        if query.is_empty() {
            return Err(KmgrError::BadRequest("query is required".into())).at("validate");
        }
        let max_bytes = req.max_bytes.unwrap_or(self.config.default_export_bytes);
        if !(MIN_EXPORT_BYTES..=MAX_EXPORT_BYTES).contains(&max_bytes) {
            return Err(KmgrError::BadRequest(format!(
                "max_bytes must be between {MIN_EXPORT_BYTES} and {MAX_EXPORT_BYTES}"
            )))
            .at("validate");
        }

        let repo = self.resolve(req.repo.as_deref())?;
        let pack = self.ensure_pack(&repo)?;
        let out = req
            .out_file
            .clone()
            .unwrap_or_else(|| self.default_export_path());

        let payload = self
            .retry
            .run("export", || {
                let mut reader = PackReader::open(&pack)?;
                let snapshot = reader.snapshot()?;
                let chat = reader.chat_log()?;
                let payload = export::render(
                    &export::collect_hits(query, &chat, &snapshot),
                    max_bytes,
                );
                if payload.bytes == 0 {
                    return Err(KmgrError::EmptyExport(format!(
                        "Nothing in pack '{}' matched '{query}' (broaden the query or rebuild)",
                        repo.alias
                    )));
                }
                write_atomically(&out, payload.text.as_bytes())?;
                Ok(payload)
            })
            .at("export")?;

        tracing::info!(
            alias = %repo.alias,
            bytes = payload.bytes,
            hits = payload.hits,
            out = %out.display(),
            "Context exported"
        );
        Ok(PackOutcome::success(
            "export",
            format!(
                "Exported {} hits ({} bytes) to {}",
                payload.hits,
                payload.bytes,
                out.display()
            ),
            json!({
                "pack": pack,
                "out_file": out,
                "bytes": payload.bytes,
                "hits": payload.hits,
            }),
        ))
    }
}

fn settle(result: StepResult<PackOutcome>) -> PackOutcome {
    result.unwrap_or_else(|failure| {
        tracing::warn!(step = failure.step, "Pack operation failed: {}", failure.error);
        PackOutcome::failure(failure.step, &failure.error)
    })
}

fn file_size(path: &Path) -> Result<u64> {
    Ok(fs::metadata(path)?.len())
}

/// Write `bytes` to a temp file beside `dest`, then rename it into place
fn write_atomically(dest: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match dest.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir)?;
    let mut tmp = NamedTempFile::new_in(&dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(dest).map_err(|e| KmgrError::Io(e.error))?;
    Ok(())
}
