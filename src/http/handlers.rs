//! HTTP request handlers for the file service
//!
//! Every handler parses its query string by hand so that malformed
//! values come back as 400 with the JSON error envelope. File work
//! runs on the blocking pool.

use std::str::FromStr;
use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use crate::core::error::{KmgrError, Result};
use crate::core::services::Services;
use crate::core::types::*;

/// Endpoints advertised by the descriptor
pub const ENDPOINTS: &[&str] = &[
    "GET /health",
    "GET /chunk?path=&offset=&length=&encoding=utf8|base64",
    "GET /lines?path=&start=&end=",
    "GET /stat?path=&hash=sha256",
    "GET /search?path=&q=&regex=0|1&i=0|1&max=",
];

#[derive(Debug, Default, Deserialize)]
pub struct ChunkParams {
    pub path: Option<String>,
    pub offset: Option<String>,
    pub length: Option<String>,
    pub encoding: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LinesParams {
    pub path: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct StatParams {
    pub path: Option<String>,
    pub hash: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub path: Option<String>,
    pub q: Option<String>,
    pub regex: Option<String>,
    /// Case-insensitive flag; `icase` is accepted too
    #[serde(alias = "icase")]
    pub i: Option<String>,
    pub max: Option<String>,
}

type Params<T> = std::result::Result<Query<T>, QueryRejection>;

fn params<T>(query: Params<T>) -> Result<T> {
    query
        .map(|Query(p)| p)
        .map_err(|e| KmgrError::BadRequest(e.body_text()))
}

fn required(value: Option<String>, name: &str) -> Result<String> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(KmgrError::BadRequest(format!("{name} is required"))),
    }
}

fn number<T: FromStr>(value: Option<&str>, name: &str) -> Result<Option<T>> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => v
            .parse()
            .map(Some)
            .map_err(|_| KmgrError::BadRequest(format!("{name} must be an integer, got '{v}'"))),
    }
}

fn flag(value: Option<&str>, name: &str) -> Result<bool> {
    match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
        None | Some("") | Some("0") | Some("false") | Some("no") => Ok(false),
        Some("1") | Some("true") | Some("yes") => Ok(true),
        Some(other) => Err(KmgrError::BadRequest(format!(
            "{name} must be 0 or 1, got '{other}'"
        ))),
    }
}

/// Run file work on the blocking pool
async fn blocking<T, F>(work: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| KmgrError::Internal(format!("Worker task failed: {e}")))?
}

/// Health check handler
pub async fn health_handler(State(services): State<Arc<Services>>) -> impl IntoResponse {
    Json(HealthResponse {
        ok: true,
        roots: services.files.roots(),
    })
}

/// Service descriptor handler (`GET /`)
pub async fn descriptor_handler(State(services): State<Arc<Services>>) -> impl IntoResponse {
    let files = &services.config.files;
    Json(ServiceDescriptor {
        name: "kmgr-files".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        port: files.port,
        roots: services.files.roots(),
        limits: ServiceLimits {
            max_chunk_bytes: files.max_chunk_bytes,
            max_lines: files.max_lines,
            assumed_line_bytes: files.assumed_line_bytes,
            max_search_bytes: files.max_search_bytes,
            max_search_results: files.max_search_results,
            default_encoding: files.default_encoding,
        },
        endpoints: ENDPOINTS.iter().map(|e| e.to_string()).collect(),
    })
}

/// Disallow all crawling
pub async fn robots_handler() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        "User-agent: *\nDisallow: /\n",
    )
}

/// Byte-range read handler
///
/// # Errors
///
/// - `BadRequest`: missing `path`, unparsable numbers or encoding
/// - `AccessDenied`: path outside the configured roots
/// - `NotFound`: file does not exist
pub async fn chunk_handler(
    State(services): State<Arc<Services>>,
    query: Params<ChunkParams>,
) -> Result<Json<ChunkResult>> {
    let p = params(query)?;
    let path = required(p.path, "path")?;
    let offset: u64 = number(p.offset.as_deref(), "offset")?.unwrap_or(0);
    let length: Option<i64> = number(p.length.as_deref(), "length")?;
    let encoding = match p.encoding.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(e) => Some(e.parse::<TextEncoding>()?),
    };

    let files = Arc::clone(&services.files);
    let result = blocking(move || files.chunk(&path, offset, length, encoding)).await?;
    Ok(Json(result))
}

/// Line window handler
pub async fn lines_handler(
    State(services): State<Arc<Services>>,
    query: Params<LinesParams>,
) -> Result<Json<LineWindow>> {
    let p = params(query)?;
    let path = required(p.path, "path")?;
    let start: Option<usize> = number(p.start.as_deref(), "start")?;
    let end: Option<usize> = number(p.end.as_deref(), "end")?;

    let files = Arc::clone(&services.files);
    let result = blocking(move || files.lines(&path, start, end)).await?;
    Ok(Json(result))
}

/// Metadata handler; `hash=sha256` adds a full-file digest
pub async fn stat_handler(
    State(services): State<Arc<Services>>,
    query: Params<StatParams>,
) -> Result<Json<StatResult>> {
    let p = params(query)?;
    let path = required(p.path, "path")?;
    let want_hash = match p.hash.as_deref().map(str::trim) {
        None | Some("") => false,
        Some(h) if h.eq_ignore_ascii_case("sha256") => true,
        Some(other) => {
            return Err(KmgrError::BadRequest(format!(
                "Unsupported hash '{other}' (only sha256)"
            )))
        }
    };

    let files = Arc::clone(&services.files);
    let result = blocking(move || files.stat(&path, want_hash)).await?;
    Ok(Json(result))
}

/// Search handler
pub async fn search_handler(
    State(services): State<Arc<Services>>,
    query: Params<SearchParams>,
) -> Result<Json<SearchResult>> {
    let p = params(query)?;
    let path = required(p.path, "path")?;
    let q = required(p.q, "q")?;
    let regex = flag(p.regex.as_deref(), "regex")?;
    let icase = flag(p.i.as_deref(), "i")?;
    let max: Option<usize> = number(p.max.as_deref(), "max")?;

    let files = Arc::clone(&services.files);
    let result = blocking(move || files.search(&path, &q, regex, icase, max)).await?;
    Ok(Json(result))
}

/// Unknown route
pub async fn not_found_handler() -> KmgrError {
    KmgrError::NotFound("No such endpoint".to_string())
}
