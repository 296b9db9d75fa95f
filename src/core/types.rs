//! Core data types for kmgr.
//!
//! This module defines the result shapes returned by the file access
//! operations and the uniform envelope returned by pack operations.

use crate::core::error::KmgrError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Text encoding applied to chunk payloads
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextEncoding {
    /// Lossy UTF-8 text
    #[default]
    Utf8,
    /// Standard base64 of the raw bytes
    Base64,
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextEncoding::Utf8 => write!(f, "utf8"),
            TextEncoding::Base64 => write!(f, "base64"),
        }
    }
}

impl FromStr for TextEncoding {
    type Err = KmgrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "utf8" | "utf-8" => Ok(TextEncoding::Utf8),
            "base64" => Ok(TextEncoding::Base64),
            other => Err(KmgrError::BadRequest(format!(
                "Unsupported encoding '{other}' (expected utf8 or base64)"
            ))),
        }
    }
}

/// A bounded byte-range read of a file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkResult {
    pub path: String,
    pub size: u64,
    pub offset: u64,
    /// Raw bytes read (before encoding)
    pub bytes: u64,
    /// Offset to request next; equals `size` at end of file
    pub next_offset: u64,
    pub eof: bool,
    pub encoding: TextEncoding,
    pub data: String,
}

/// A bounded window of text lines
///
/// `eof` describes the scanned prefix, not the whole file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineWindow {
    pub path: String,
    pub size: u64,
    /// First line number returned (1-based)
    pub start: usize,
    /// Last line number returned; `start - 1` when no line was returned
    pub end: usize,
    pub lines: Vec<String>,
    pub next_start: usize,
    pub eof: bool,
}

/// One search hit, the first match on its line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    /// 1-based line number
    pub line: usize,
    /// 1-based character column
    pub col: usize,
    #[serde(rename = "match")]
    pub matched: String,
    pub preview: String,
}

/// Search results over a capped prefix of a file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub path: String,
    pub size: u64,
    /// The file is larger than the scan cap
    pub truncated: bool,
    pub query: String,
    pub regex: bool,
    pub icase: bool,
    pub max: usize,
    pub results: Vec<SearchHit>,
}

/// File metadata with an optional content digest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatResult {
    pub path: String,
    pub size: u64,
    /// Modification time, RFC 3339
    pub mtime: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub roots: Vec<String>,
}

/// Limits advertised by the service descriptor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceLimits {
    pub max_chunk_bytes: u64,
    pub max_lines: usize,
    pub assumed_line_bytes: u64,
    pub max_search_bytes: u64,
    pub max_search_results: usize,
    pub default_encoding: TextEncoding,
}

/// Response of `GET /`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceDescriptor {
    pub name: String,
    pub version: String,
    pub port: u16,
    pub roots: Vec<String>,
    pub limits: ServiceLimits,
    pub endpoints: Vec<String>,
}

/// Author of a chat record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
    Tool,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::System => "system",
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
            ChatRole::Tool => "tool",
        }
    }
}

impl fmt::Display for ChatRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChatRole {
    type Err = KmgrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "system" => Ok(ChatRole::System),
            "user" => Ok(ChatRole::User),
            "assistant" => Ok(ChatRole::Assistant),
            "tool" => Ok(ChatRole::Tool),
            other => Err(KmgrError::BadRequest(format!(
                "Invalid role '{other}' (expected system, user, assistant or tool)"
            ))),
        }
    }
}

/// One line of `chat.jsonl`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRecord {
    pub ts: String,
    pub role: ChatRole,
    pub content: String,
    /// SHA-256 hex of `content`
    pub cksum: String,
}

/// Uniform result of every pack operation
///
/// Failures are reported here with `ok = false` instead of being
/// raised to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackOutcome {
    pub ok: bool,
    pub step: String,
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl PackOutcome {
    pub fn success(step: &str, summary: impl Into<String>, data: Value) -> Self {
        Self {
            ok: true,
            step: step.to_string(),
            summary: summary.into(),
            data: Some(data),
        }
    }

    pub fn failure(step: &str, error: &KmgrError) -> Self {
        Self {
            ok: false,
            step: step.to_string(),
            summary: error.message(),
            data: None,
        }
    }
}
