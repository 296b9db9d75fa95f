//! Context export tool handler

use super::handler::McpToolHandler;
use super::helpers::{outcome_result, parse_args, run_pack};
use crate::core::config::{MAX_EXPORT_BYTES, MIN_EXPORT_BYTES};
use crate::core::pack::ExportRequest;
use crate::core::services::Services;
use crate::mcp::error::McpError;
use crate::mcp::protocol::{ToolResult, ToolSchema};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

/// Handler for export_context MCP tool
pub struct ExportContextHandler {
    services: Arc<Services>,
}

impl ExportContextHandler {
    pub fn new(services: Arc<Services>) -> Self {
        Self { services }
    }
}

#[async_trait]
impl McpToolHandler for ExportContextHandler {
    fn name(&self) -> &str {
        "export_context"
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "export_context".to_string(),
            description: "Write a JSONL context payload of pack entries containing the query \
                          (case-insensitive). Matching chat lines come first, then repository \
                          files ranked by number of occurrences, cut off at max_bytes. The file \
                          is only written when at least one entry fits."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "minLength": 1
                    },
                    "repo": {
                        "type": "string",
                        "description": "Alias or directory path"
                    },
                    "max_bytes": {
                        "type": "integer",
                        "minimum": MIN_EXPORT_BYTES,
                        "maximum": MAX_EXPORT_BYTES,
                        "default": self.services.config.packs.default_export_bytes
                    },
                    "out_file": {
                        "type": "string",
                        "description": "Destination (default: scratch/context_payload.txt)"
                    }
                },
                "required": ["query"],
                "additionalProperties": false
            }),
        }
    }

    async fn execute(&self, args: Value) -> Result<ToolResult, McpError> {
        let req: ExportRequest = parse_args(args)?;
        let packs = Arc::clone(&self.services.packs);
        let outcome = run_pack(move || packs.export(&req)).await?;
        outcome_result(&outcome)
    }
}
