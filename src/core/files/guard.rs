//! Access-root enforcement for requested paths.
//!
//! Every path is normalized lexically (`.` and `..` collapsed) before
//! it is compared against the roots, then checked a second time after
//! symlink resolution of its deepest existing ancestor.

use std::path::{Component, Path, PathBuf};

use crate::core::error::{KmgrError, Result};

/// Resolves request paths and rejects anything outside the roots
#[derive(Debug, Clone)]
pub struct PathGuard {
    /// Roots as configured, normalized
    roots: Vec<PathBuf>,

    /// Normalized and canonical forms of every root
    match_roots: Vec<PathBuf>,

    /// Base for relative request paths
    working_dir: PathBuf,
}

impl PathGuard {
    /// Create a guard over `roots`, resolving relative input against
    /// `working_dir`
    pub fn new(roots: &[PathBuf], working_dir: &Path) -> Self {
        let working_dir = absolutize(working_dir);

        let mut normalized = Vec::new();
        let mut match_roots = Vec::new();
        for root in roots {
            let root = normalize_path(&working_dir.join(root));
            if let Ok(real) = root.canonicalize() {
                if !match_roots.contains(&real) {
                    match_roots.push(real);
                }
            }
            if !match_roots.contains(&root) {
                match_roots.push(root.clone());
            }
            if !normalized.contains(&root) {
                normalized.push(root);
            }
        }

        Self {
            roots: normalized,
            match_roots,
            working_dir,
        }
    }

    /// Configured roots, normalized
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Resolve `input` to an absolute path under one of the roots
    ///
    /// # Errors
    ///
    /// - `BadRequest`: empty input
    /// - `AccessDenied`: the normalized or symlink-resolved path lies
    ///   outside every root
    pub fn resolve(&self, input: &str) -> Result<PathBuf> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(KmgrError::BadRequest("path cannot be empty".to_string()));
        }

        let raw = Path::new(trimmed);
        let joined = if raw.is_absolute() {
            raw.to_path_buf()
        } else {
            self.working_dir.join(raw)
        };
        let normalized = normalize_path(&joined);

        if !self.is_allowed(&normalized) {
            return Err(self.deny(input, &normalized));
        }

        let real = resolve_existing_prefix(&normalized);
        if self.is_allowed(&real) {
            Ok(real)
        } else {
            Err(self.deny(input, &real))
        }
    }

    fn is_allowed(&self, path: &Path) -> bool {
        self.match_roots.iter().any(|root| path.starts_with(root))
    }

    fn deny(&self, input: &str, resolved: &Path) -> KmgrError {
        tracing::warn!(
            requested = %input,
            resolved = %resolved.display(),
            "Rejected path outside access roots"
        );
        KmgrError::AccessDenied(format!("{input} is outside the allowed roots"))
    }
}

/// Collapse `.` and `..` without touching the filesystem
///
/// `..` at the root stays at the root.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => out.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            Component::Normal(part) => out.push(part),
        }
    }
    out
}

/// Canonicalize the deepest existing ancestor of `path` and re-append
/// the missing tail, so a missing file under a symlinked directory is
/// judged by where the link points.
fn resolve_existing_prefix(path: &Path) -> PathBuf {
    let mut existing = path;
    let mut tail = Vec::new();
    loop {
        if let Ok(real) = existing.canonicalize() {
            return tail.iter().rev().fold(real, |acc: PathBuf, part| acc.join(part));
        }
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                tail.push(name.to_os_string());
                existing = parent;
            }
            _ => return path.to_path_buf(),
        }
    }
}

fn absolutize(path: &Path) -> PathBuf {
    if path.is_absolute() {
        normalize_path(path)
    } else {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("/"));
        normalize_path(&cwd.join(path))
    }
}
