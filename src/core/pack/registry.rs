//! Repository alias registry (`repos.json`).
//!
//! Maps short aliases to repository directories and remembers an
//! optional default alias. Writes go through a temp file and rename.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::core::error::{KmgrError, Result};

static ALIAS_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9._-]{1,64}$").unwrap());
static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\W+").unwrap());

/// On-disk registry document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistryFile {
    #[serde(default)]
    pub aliases: BTreeMap<String, PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

/// A repository chosen for a pack operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRepo {
    pub alias: String,
    pub path: PathBuf,
}

/// Alias registry stored at a fixed path
#[derive(Debug, Clone)]
pub struct RepoRegistry {
    path: PathBuf,
}

impl RepoRegistry {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the registry; a missing or unreadable file reads as empty
    pub fn load(&self) -> RegistryFile {
        let Ok(contents) = fs::read_to_string(&self.path) else {
            return RegistryFile::default();
        };
        serde_json::from_str(&contents).unwrap_or_else(|e| {
            tracing::warn!("Ignoring unreadable registry {:?}: {}", self.path, e);
            RegistryFile::default()
        })
    }

    /// Register `alias` for the directory at `path`
    ///
    /// # Errors
    ///
    /// - `BadRequest`: alias fails `^[A-Za-z0-9._-]{1,64}$` or path is
    ///   not an existing directory
    pub fn set_alias(&self, alias: &str, path: &Path, make_default: bool) -> Result<RegistryFile> {
        if !ALIAS_PATTERN.is_match(alias) {
            return Err(KmgrError::BadRequest(format!("Invalid alias '{alias}'")));
        }
        let dir = path
            .canonicalize()
            .map_err(|_| KmgrError::BadRequest(format!("Path not found: {}", path.display())))?;
        if !dir.is_dir() {
            return Err(KmgrError::BadRequest(format!(
                "Path is not a directory: {}",
                dir.display()
            )));
        }

        let mut registry = self.load();
        registry.aliases.insert(alias.to_string(), dir);
        if make_default {
            registry.default = Some(alias.to_string());
        }
        self.save(&registry)?;
        Ok(registry)
    }

    /// Pick the repository for an operation
    ///
    /// Order: explicit `repo` (alias, then directory path), the
    /// configured `fallback` by the same rules, then the registry's
    /// default alias.
    pub fn resolve(&self, repo: Option<&str>, fallback: Option<&str>) -> Result<ResolvedRepo> {
        let registry = self.load();

        for candidate in [repo, fallback].into_iter().flatten() {
            let candidate = candidate.trim();
            if candidate.is_empty() {
                continue;
            }
            return resolve_candidate(&registry, candidate);
        }

        if let Some(alias) = &registry.default {
            if let Some(path) = registry.aliases.get(alias) {
                return Ok(ResolvedRepo {
                    alias: alias.clone(),
                    path: path.clone(),
                });
            }
        }

        Err(KmgrError::BadRequest(
            "No repository resolved: pass a repo alias or path, set KMGR_REPO, or register a default alias"
                .to_string(),
        ))
    }

    fn save(&self, registry: &RegistryFile) -> Result<()> {
        let parent = self.path.parent().unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent)?;
        let mut tmp = NamedTempFile::new_in(parent)?;
        tmp.write_all(serde_json::to_string_pretty(registry)?.as_bytes())?;
        tmp.persist(&self.path).map_err(|e| KmgrError::Io(e.error))?;
        Ok(())
    }
}

fn resolve_candidate(registry: &RegistryFile, candidate: &str) -> Result<ResolvedRepo> {
    if let Some(path) = registry.aliases.get(candidate) {
        return Ok(ResolvedRepo {
            alias: candidate.to_string(),
            path: path.clone(),
        });
    }

    let dir = Path::new(candidate)
        .canonicalize()
        .ok()
        .filter(|p| p.is_dir())
        .ok_or_else(|| {
            KmgrError::BadRequest(format!("Repo is neither an alias nor a directory: {candidate}"))
        })?;

    Ok(ResolvedRepo {
        alias: derive_alias(&dir),
        path: dir,
    })
}

/// Alias for an unregistered directory, from its final component
pub fn derive_alias(dir: &Path) -> String {
    let name = dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let alias = NON_WORD.replace_all(&name, "_").into_owned();
    if alias.is_empty() {
        "repo".to_string()
    } else {
        alias
    }
}
