//! Repository walker for pack builds.
//!
//! Collects files whose name matches an include glob, pruning any
//! directory whose name is on the exclude list. Walk errors such as
//! permission denied are logged and skipped.

use glob::Pattern;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use crate::core::error::{KmgrError, Result};

/// File system walker with pattern-based filtering
pub struct RepoWalker {
    /// Globs matched against the file name (e.g. "*.rs", "*.md")
    include_patterns: Vec<Pattern>,

    /// Directory names to prune, lowercased
    exclude_dirs: Vec<String>,
}

impl RepoWalker {
    /// Create a walker
    ///
    /// # Errors
    ///
    /// - `ConfigError`: an include pattern is not a valid glob
    pub fn new(include_patterns: &[String], exclude_dirs: &[String]) -> Result<Self> {
        let include = include_patterns
            .iter()
            .map(|p| {
                Pattern::new(p).map_err(|e| {
                    KmgrError::ConfigError(format!("Invalid include pattern '{p}': {e}"))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            include_patterns: include,
            exclude_dirs: exclude_dirs.iter().map(|d| d.to_lowercase()).collect(),
        })
    }

    /// Collect matching files under `root`, sorted by path
    pub fn collect_files(&self, root: &Path) -> Vec<PathBuf> {
        let mut files = Vec::new();

        for entry in WalkDir::new(root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| self.should_descend(e, root))
        {
            match entry {
                Ok(entry) => {
                    if entry.file_type().is_file() && self.matches_include(entry.path()) {
                        files.push(entry.into_path());
                    }
                }
                Err(e) => {
                    tracing::warn!("Walk error: {}", e);
                }
            }
        }

        files.sort();
        files
    }

    fn should_descend(&self, entry: &DirEntry, root: &Path) -> bool {
        if entry.path() == root || !entry.file_type().is_dir() {
            return true;
        }
        let name = entry.file_name().to_string_lossy().to_lowercase();
        if self.exclude_dirs.contains(&name) {
            tracing::debug!("Skipping excluded directory: {:?}", entry.path());
            return false;
        }
        true
    }

    fn matches_include(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|f| f.to_str()) else {
            return false;
        };
        self.include_patterns.iter().any(|p| p.matches(name))
    }
}
