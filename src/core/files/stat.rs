//! File metadata with an optional streamed SHA-256.

use std::fs::{File, Metadata};
use std::io::Read;
use std::path::Path;

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

use crate::core::error::Result;
use crate::core::types::StatResult;

/// Build a stat result; a failed digest is reported in the `sha256`
/// field instead of failing the call
pub fn stat_file(path: &Path, metadata: &Metadata, want_hash: bool) -> Result<StatResult> {
    let mtime: DateTime<Utc> = metadata.modified()?.into();

    let sha256 = if want_hash {
        Some(match sha256_file(path) {
            Ok(digest) => digest,
            Err(e) => {
                tracing::warn!(path = %path.display(), "Hash failed: {}", e);
                format!("error: {e}")
            }
        })
    } else {
        None
    };

    Ok(StatResult {
        path: path.display().to_string(),
        size: metadata.len(),
        mtime: mtime.to_rfc3339(),
        sha256,
    })
}

/// Stream the whole file through SHA-256 and return the hex digest
pub fn sha256_file(path: &Path) -> Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 64 * 1024];
    loop {
        let read = file.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }
    Ok(hex::encode(hasher.finalize()))
}
