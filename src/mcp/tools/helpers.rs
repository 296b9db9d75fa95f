//! Shared helpers for pack tools

use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use super::handler::text_content;
use crate::core::types::PackOutcome;
use crate::mcp::error::McpError;
use crate::mcp::protocol::ToolResult;

/// Deserialize tool arguments; absent arguments read as `{}`
pub fn parse_args<T: DeserializeOwned>(args: Value) -> Result<T, McpError> {
    let args = if args.is_null() { json!({}) } else { args };
    serde_json::from_value(args)
        .map_err(|e| McpError::InvalidParams(format!("Invalid parameters: {e}")))
}

/// Run a pack operation on the blocking pool
pub async fn run_pack<F>(op: F) -> Result<PackOutcome, McpError>
where
    F: FnOnce() -> PackOutcome + Send + 'static,
{
    tokio::task::spawn_blocking(op)
        .await
        .map_err(|e| McpError::InternalError(format!("Pack task failed: {e}")))
}

/// Render an outcome envelope as the tool's text result
///
/// A failed operation is still a successful tool call; it is flagged
/// with `isError` and the envelope carries the details.
pub fn outcome_result(outcome: &PackOutcome) -> Result<ToolResult, McpError> {
    let mut result = text_content(serde_json::to_string_pretty(outcome)?);
    result.is_error = !outcome.ok;
    Ok(result)
}
