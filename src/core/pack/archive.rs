//! Knowledge pack container (`.kpkg`, schema `KPKG-1`).
//!
//! A zip file with four members:
//!
//! - `meta.json`: build metadata
//! - `repo_index.csv`: `path\toffset\tlength\tsha256` per file
//! - `repo_content.bin`: normalized file texts, each followed by NUL
//! - `chat.jsonl`: one [`ChatRecord`] per line, stored uncompressed
//!
//! Members are never edited in place. Replacing one rewrites the whole
//! container into a temp file next to the pack and renames it over.

use std::fs::{self, File};
use std::io::{Read, Seek, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::core::error::{KmgrError, Result};
use crate::core::types::ChatRecord;

pub const SCHEMA: &str = "KPKG-1";
pub const META_ENTRY: &str = "meta.json";
pub const INDEX_ENTRY: &str = "repo_index.csv";
pub const CONTENT_ENTRY: &str = "repo_content.bin";
pub const CHAT_ENTRY: &str = "chat.jsonl";

/// `meta.json` contents
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackMeta {
    pub created_utc: String,
    pub repo_root: String,
    pub schema: String,
    pub parts: PackParts,
    pub approx_bytes: u64,
    pub files: usize,
}

/// Member names recorded in `meta.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackParts {
    pub repo_index: String,
    pub repo_content: String,
    pub chat: String,
}

impl Default for PackParts {
    fn default() -> Self {
        Self {
            repo_index: INDEX_ENTRY.to_string(),
            repo_content: CONTENT_ENTRY.to_string(),
            chat: CHAT_ENTRY.to_string(),
        }
    }
}

/// One row of `repo_index.csv`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub path: String,
    pub offset: u64,
    pub length: u64,
    pub sha256: String,
}

impl IndexEntry {
    fn to_row(&self) -> String {
        format!(
            "{}\t{}\t{}\t{}\n",
            self.path, self.offset, self.length, self.sha256
        )
    }

    /// Parse a row; malformed rows yield `None`
    pub fn parse(row: &str) -> Option<Self> {
        let mut fields = row.splitn(4, '\t');
        let path = fields.next()?.to_string();
        let offset = fields.next()?.parse().ok()?;
        let length = fields.next()?.parse().ok()?;
        let sha256 = fields.next()?.trim_end().to_string();
        Some(Self {
            path,
            offset,
            length,
            sha256,
        })
    }
}

/// Repository content collected for a build
#[derive(Debug, Default)]
pub struct Snapshot {
    pub index: Vec<IndexEntry>,
    pub content: Vec<u8>,
}

impl Snapshot {
    /// Read `files` (absolute paths under `root`) into a snapshot
    ///
    /// Text is decoded lossily and CRLF is normalized to LF. Files that
    /// cannot be read are skipped.
    pub fn collect(root: &Path, files: &[PathBuf]) -> Self {
        let mut snapshot = Snapshot::default();
        for path in files {
            let raw = match fs::read(path) {
                Ok(raw) => raw,
                Err(e) => {
                    tracing::debug!("Skipping unreadable file {:?}: {}", path, e);
                    continue;
                }
            };
            let text = String::from_utf8_lossy(&raw).replace("\r\n", "\n");
            let bytes = text.as_bytes();

            snapshot.index.push(IndexEntry {
                path: relative_name(root, path),
                offset: snapshot.content.len() as u64,
                length: bytes.len() as u64,
                sha256: hex::encode(Sha256::digest(bytes)),
            });
            snapshot.content.extend_from_slice(bytes);
            snapshot.content.push(0);
        }
        snapshot
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Text of one indexed file
    pub fn text_of(&self, entry: &IndexEntry) -> String {
        let start = (entry.offset as usize).min(self.content.len());
        let end = start
            .saturating_add(entry.length as usize)
            .min(self.content.len());
        String::from_utf8_lossy(&self.content[start..end]).into_owned()
    }
}

fn relative_name(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn deflated() -> SimpleFileOptions {
    SimpleFileOptions::default().compression_method(CompressionMethod::Deflated)
}

fn stored() -> SimpleFileOptions {
    SimpleFileOptions::default().compression_method(CompressionMethod::Stored)
}

/// Write a fresh pack with an empty chat log into `out`
pub fn write_pack<W: Write + Seek>(out: W, repo_root: &Path, snapshot: &Snapshot) -> Result<()> {
    let meta = PackMeta {
        created_utc: Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string(),
        repo_root: repo_root.display().to_string(),
        schema: SCHEMA.to_string(),
        parts: PackParts::default(),
        approx_bytes: snapshot.content.len() as u64,
        files: snapshot.index.len(),
    };

    let index: String = snapshot.index.iter().map(IndexEntry::to_row).collect();

    let mut zip = ZipWriter::new(out);
    zip.start_file(META_ENTRY, deflated())?;
    zip.write_all(&serde_json::to_vec(&meta)?)?;
    zip.start_file(INDEX_ENTRY, deflated())?;
    zip.write_all(index.as_bytes())?;
    zip.start_file(CONTENT_ENTRY, deflated())?;
    zip.write_all(&snapshot.content)?;
    zip.start_file(CHAT_ENTRY, stored())?;
    zip.finish()?;
    Ok(())
}

/// Read-side handle on an existing pack
pub struct PackReader {
    archive: ZipArchive<File>,
}

impl PackReader {
    pub fn open(pack: &Path) -> Result<Self> {
        let file = File::open(pack)?;
        Ok(Self {
            archive: ZipArchive::new(file)?,
        })
    }

    /// Bytes of a member; a missing member reads as empty
    pub fn read_entry(&mut self, name: &str) -> Result<Vec<u8>> {
        match self.archive.by_name(name) {
            Ok(mut entry) => {
                let mut buffer = Vec::with_capacity(entry.size() as usize);
                entry.read_to_end(&mut buffer)?;
                Ok(buffer)
            }
            Err(zip::result::ZipError::FileNotFound) => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn meta(&mut self) -> Result<PackMeta> {
        let raw = self.read_entry(META_ENTRY)?;
        Ok(serde_json::from_slice(&raw)?)
    }

    /// Index rows and content blob
    pub fn snapshot(&mut self) -> Result<Snapshot> {
        let index_raw = self.read_entry(INDEX_ENTRY)?;
        let index = String::from_utf8_lossy(&index_raw)
            .lines()
            .filter_map(IndexEntry::parse)
            .collect();
        let content = self.read_entry(CONTENT_ENTRY)?;
        Ok(Snapshot { index, content })
    }

    /// Raw chat log text
    pub fn chat_log(&mut self) -> Result<String> {
        let raw = self.read_entry(CHAT_ENTRY)?;
        Ok(String::from_utf8_lossy(&raw).into_owned())
    }
}

/// Parse chat log lines, skipping lines that are not valid records
pub fn parse_chat(log: &str) -> Vec<ChatRecord> {
    log.lines()
        .filter(|l| !l.trim().is_empty())
        .filter_map(|l| serde_json::from_str(l).ok())
        .collect()
}

/// Replace the chat member of `pack` with `chat`
///
/// Every other member is raw-copied into a temp file in the same
/// directory, which is then renamed over the pack. On any failure the
/// temp file is removed and the pack is left untouched.
pub fn replace_chat(pack: &Path, chat: &[u8]) -> Result<()> {
    let dir = pack
        .parent()
        .ok_or_else(|| KmgrError::Internal(format!("Pack has no parent: {}", pack.display())))?;

    let mut source = ZipArchive::new(File::open(pack)?)?;
    let tmp = NamedTempFile::new_in(dir)?;
    {
        let mut zip = ZipWriter::new(tmp.as_file());
        for i in 0..source.len() {
            let entry = source.by_index_raw(i)?;
            if entry.name() == CHAT_ENTRY {
                continue;
            }
            zip.raw_copy_file(entry)?;
        }
        zip.start_file(CHAT_ENTRY, stored())?;
        zip.write_all(chat)?;
        zip.finish()?;
    }
    drop(source);

    tmp.persist(pack).map_err(|e| KmgrError::Io(e.error))?;
    Ok(())
}
