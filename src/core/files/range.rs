//! Byte-range reads with a continuation offset.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::core::error::Result;
use crate::core::types::{ChunkResult, TextEncoding};

/// Clamp a requested length into `1..=max_chunk`
///
/// Missing, non-positive and oversized lengths all become `max_chunk`.
pub fn clamp_length(length: Option<i64>, max_chunk: u64) -> u64 {
    match length {
        Some(n) if n > 0 && (n as u64) <= max_chunk => n as u64,
        _ => max_chunk,
    }
}

/// Read up to `length` bytes of `file` starting at `offset`
///
/// An offset at or beyond the end of the file yields an empty terminal
/// chunk rather than an error.
pub fn read_chunk(
    path: &Path,
    file: &mut File,
    size: u64,
    offset: u64,
    length: u64,
    encoding: TextEncoding,
) -> Result<ChunkResult> {
    let display = path.display().to_string();

    if offset >= size {
        return Ok(ChunkResult {
            path: display,
            size,
            offset,
            bytes: 0,
            next_offset: size,
            eof: true,
            encoding,
            data: String::new(),
        });
    }

    let want = length.min(size - offset);
    file.seek(SeekFrom::Start(offset))?;
    let mut buffer = Vec::with_capacity(want as usize);
    file.by_ref().take(want).read_to_end(&mut buffer)?;

    let bytes = buffer.len() as u64;
    let next_offset = offset + bytes;

    Ok(ChunkResult {
        path: display,
        size,
        offset,
        bytes,
        next_offset,
        eof: next_offset >= size,
        encoding,
        data: encode(&buffer, encoding),
    })
}

fn encode(buffer: &[u8], encoding: TextEncoding) -> String {
    match encoding {
        TextEncoding::Utf8 => String::from_utf8_lossy(buffer).into_owned(),
        TextEncoding::Base64 => STANDARD.encode(buffer),
    }
}
