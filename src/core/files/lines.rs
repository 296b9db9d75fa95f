//! Line windows over a capped prefix of a file.
//!
//! Only the first `max_lines * assumed_line_bytes` bytes are read, so
//! files whose lines run longer than the assumption can return fewer
//! lines than exist. `eof` reports on the scanned prefix only.

use std::fs::File;
use std::path::Path;

use super::read_prefix;
use crate::core::error::{KmgrError, Result};
use crate::core::types::LineWindow;

/// Window limits for a line read
#[derive(Debug, Clone, Copy)]
pub struct LineLimits {
    pub max_lines: usize,
    pub assumed_line_bytes: u64,
}

impl LineLimits {
    /// Bytes scanned for a file of `size` bytes
    pub fn prefix_bytes(&self, size: u64) -> u64 {
        size.min((self.max_lines as u64).saturating_mul(self.assumed_line_bytes))
    }
}

/// Return lines `start..=end` (1-based), at most `max_lines` of them
///
/// # Errors
///
/// - `BadRequest`: `start` is 0 or `end < start`
pub fn read_lines(
    path: &Path,
    file: &mut File,
    size: u64,
    start: usize,
    end: Option<usize>,
    limits: LineLimits,
) -> Result<LineWindow> {
    if start == 0 {
        return Err(KmgrError::BadRequest("start must be >= 1".to_string()));
    }
    let requested_end = end.unwrap_or(usize::MAX);
    if requested_end < start {
        return Err(KmgrError::BadRequest("end must be >= start".to_string()));
    }
    let window_end = requested_end.min(start.saturating_add(limits.max_lines - 1));

    let prefix_len = limits.prefix_bytes(size);
    let prefix = read_prefix(file, prefix_len)?;
    let text = String::from_utf8_lossy(&prefix);
    let all = split_lines(&text, prefix_len < size);
    let total = all.len();

    let first = start - 1;
    let (lines, end) = if first >= total {
        (Vec::new(), start - 1)
    } else {
        let last = window_end.min(total);
        (all[first..last].to_vec(), last)
    };

    Ok(LineWindow {
        path: path.display().to_string(),
        size,
        start,
        end,
        lines,
        next_start: end + 1,
        eof: end >= total,
    })
}

/// Split on `\n`, stripping a trailing `\r` from each line
///
/// The empty segment after a final newline is not a line. When the
/// prefix was cut short, the trailing fragment is dropped unless it is
/// the only line seen.
pub(crate) fn split_lines(text: &str, truncated: bool) -> Vec<String> {
    let mut segments: Vec<&str> = text.split('\n').collect();
    if let Some(last) = segments.last() {
        if last.is_empty() || (truncated && segments.len() > 1) {
            segments.pop();
        }
    }
    segments
        .into_iter()
        .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
        .collect()
}
