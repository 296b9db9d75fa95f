//! Read-only file access over a fixed set of roots.
//!
//! - **guard**: path normalization and root enforcement
//! - **range**: byte windows (`/chunk`)
//! - **lines**: line windows over a capped prefix (`/lines`)
//! - **search**: literal/regex search over a capped prefix (`/search`)
//! - **stat**: size, mtime and optional SHA-256 (`/stat`)
//!
//! Every operation resolves its path through the guard first and
//! reads a bounded number of bytes.

pub mod guard;
pub mod lines;
pub mod range;
pub mod search;
pub mod stat;

use std::fs::{self, File, Metadata};
use std::io::{Read, Seek};
use std::path::Path;

pub use guard::{normalize_path, PathGuard};
pub use lines::LineLimits;
pub use search::{SearchQuery, DEFAULT_MAX_RESULTS};

use crate::core::config::FilesConfig;
use crate::core::error::{KmgrError, Result};
use crate::core::types::{ChunkResult, LineWindow, SearchResult, StatResult, TextEncoding};

/// File access service shared by all request handlers
#[derive(Debug, Clone)]
pub struct FileService {
    guard: PathGuard,
    limits: FilesConfig,
}

impl FileService {
    pub fn new(config: &FilesConfig) -> Self {
        Self {
            guard: PathGuard::new(&config.roots, &config.working_dir),
            limits: config.clone(),
        }
    }

    pub fn guard(&self) -> &PathGuard {
        &self.guard
    }

    /// Roots as display strings
    pub fn roots(&self) -> Vec<String> {
        self.guard
            .roots()
            .iter()
            .map(|r| r.display().to_string())
            .collect()
    }

    /// Byte window starting at `offset`
    pub fn chunk(
        &self,
        path: &str,
        offset: u64,
        length: Option<i64>,
        encoding: Option<TextEncoding>,
    ) -> Result<ChunkResult> {
        let resolved = self.guard.resolve(path)?;
        let (mut file, metadata) = open_regular(&resolved)?;
        let length = range::clamp_length(length, self.limits.max_chunk_bytes);
        range::read_chunk(
            &resolved,
            &mut file,
            metadata.len(),
            offset,
            length,
            encoding.unwrap_or(self.limits.default_encoding),
        )
    }

    /// Line window `start..=end`
    pub fn lines(&self, path: &str, start: Option<usize>, end: Option<usize>) -> Result<LineWindow> {
        let resolved = self.guard.resolve(path)?;
        let (mut file, metadata) = open_regular(&resolved)?;
        lines::read_lines(
            &resolved,
            &mut file,
            metadata.len(),
            start.unwrap_or(1),
            end,
            LineLimits {
                max_lines: self.limits.max_lines,
                assumed_line_bytes: self.limits.assumed_line_bytes,
            },
        )
    }

    /// Search the capped prefix of a file
    ///
    /// The pattern is compiled before the file is touched. `max` is
    /// clamped to `1..=max_search_results`.
    pub fn search(
        &self,
        path: &str,
        query: &str,
        regex: bool,
        icase: bool,
        max: Option<usize>,
    ) -> Result<SearchResult> {
        let query = SearchQuery {
            query: query.to_string(),
            regex,
            icase,
            max: max
                .unwrap_or(DEFAULT_MAX_RESULTS)
                .clamp(1, self.limits.max_search_results),
        };
        let matcher = query.compile()?;

        let resolved = self.guard.resolve(path)?;
        let (mut file, metadata) = open_regular(&resolved)?;
        search::search_prefix(
            &resolved,
            &mut file,
            metadata.len(),
            &query,
            &matcher,
            self.limits.max_search_bytes,
        )
    }

    /// Size, mtime and optionally the SHA-256 of the whole file
    pub fn stat(&self, path: &str, want_hash: bool) -> Result<StatResult> {
        let resolved = self.guard.resolve(path)?;
        let (_file, metadata) = open_regular(&resolved)?;
        stat::stat_file(&resolved, &metadata, want_hash)
    }
}

/// Open a regular file, mapping a missing target to `NotFound`
fn open_regular(path: &Path) -> Result<(File, Metadata)> {
    let metadata = fs::metadata(path).map_err(|e| not_found_or_io(path, e))?;
    if !metadata.is_file() {
        return Err(KmgrError::BadRequest(format!(
            "{} is not a regular file",
            path.display()
        )));
    }
    let file = File::open(path).map_err(|e| not_found_or_io(path, e))?;
    Ok((file, metadata))
}

fn not_found_or_io(path: &Path, err: std::io::Error) -> KmgrError {
    if err.kind() == std::io::ErrorKind::NotFound {
        KmgrError::NotFound(path.display().to_string())
    } else {
        KmgrError::Io(err)
    }
}

/// Read at most `limit` bytes from the start of `file`
pub(crate) fn read_prefix(file: &mut File, limit: u64) -> Result<Vec<u8>> {
    file.rewind()?;
    let mut buffer = Vec::with_capacity(limit as usize);
    file.by_ref().take(limit).read_to_end(&mut buffer)?;
    Ok(buffer)
}
