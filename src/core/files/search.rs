//! Literal and regex search over a capped prefix of a file.

use std::fs::File;
use std::path::Path;

use regex::{Regex, RegexBuilder};

use super::lines::split_lines;
use super::read_prefix;
use crate::core::error::{KmgrError, Result};
use crate::core::types::{SearchHit, SearchResult};

/// Default result cap when the caller names none
pub const DEFAULT_MAX_RESULTS: usize = 100;

/// Longest preview emitted per hit, in characters
const PREVIEW_CHARS: usize = 200;

/// Parsed search request
#[derive(Debug, Clone)]
pub struct SearchQuery {
    pub query: String,
    pub regex: bool,
    pub icase: bool,
    pub max: usize,
}

impl SearchQuery {
    /// Compile the query into a matcher
    ///
    /// Literal queries are escaped so both modes share one code path.
    ///
    /// # Errors
    ///
    /// - `BadRequest`: empty query or invalid regex syntax
    pub fn compile(&self) -> Result<Regex> {
        if self.query.is_empty() {
            return Err(KmgrError::BadRequest("q cannot be empty".to_string()));
        }

        let pattern = if self.regex {
            self.query.clone()
        } else {
            regex::escape(&self.query)
        };

        RegexBuilder::new(&pattern)
            .case_insensitive(self.icase)
            .build()
            .map_err(|e| KmgrError::BadRequest(format!("Invalid regex: {e}")))
    }
}

/// Search the first `max_search_bytes` of `file`
///
/// Records the first match on each line until `query.max` hits are
/// collected. `matcher` must come from `query.compile()`.
pub fn search_prefix(
    path: &Path,
    file: &mut File,
    size: u64,
    query: &SearchQuery,
    matcher: &Regex,
    max_search_bytes: u64,
) -> Result<SearchResult> {
    let truncated = size > max_search_bytes;
    let prefix = read_prefix(file, size.min(max_search_bytes))?;
    let text = String::from_utf8_lossy(&prefix);

    let mut results = Vec::new();
    for (index, line) in split_lines(&text, false).iter().enumerate() {
        if results.len() >= query.max {
            break;
        }
        if let Some(m) = matcher.find(line) {
            results.push(SearchHit {
                line: index + 1,
                col: line[..m.start()].chars().count() + 1,
                matched: m.as_str().to_string(),
                preview: preview(line),
            });
        }
    }

    tracing::debug!(
        path = %path.display(),
        hits = results.len(),
        truncated,
        "Search complete"
    );

    Ok(SearchResult {
        path: path.display().to_string(),
        size,
        truncated,
        query: query.query.clone(),
        regex: query.regex,
        icase: query.icase,
        max: query.max,
        results,
    })
}

fn preview(line: &str) -> String {
    line.trim().chars().take(PREVIEW_CHARS).collect()
}
