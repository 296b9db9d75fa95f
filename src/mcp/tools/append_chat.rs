//! Chat append tool handler

use super::handler::McpToolHandler;
use super::helpers::{outcome_result, parse_args, run_pack};
use crate::core::pack::AppendRequest;
use crate::core::services::Services;
use crate::mcp::error::McpError;
use crate::mcp::protocol::{ToolResult, ToolSchema};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

/// Handler for append_chat MCP tool
pub struct AppendChatHandler {
    services: Arc<Services>,
}

impl AppendChatHandler {
    pub fn new(services: Arc<Services>) -> Self {
        Self { services }
    }
}

#[async_trait]
impl McpToolHandler for AppendChatHandler {
    fn name(&self) -> &str {
        "append_chat"
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "append_chat".to_string(),
            description: "Append one chat turn to the repository's knowledge pack, building the \
                          pack first if needed. With dedup=true (default) identical content \
                          already in the log is not written again; the result then reports \
                          deduplicated=true and delta_bytes=0."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "role": {
                        "type": "string",
                        "enum": ["system", "user", "assistant", "tool"]
                    },
                    "content": {
                        "type": "string",
                        "minLength": 1,
                        "maxLength": self.services.config.packs.max_content_bytes
                    },
                    "repo": {
                        "type": "string",
                        "description": "Alias or directory path"
                    },
                    "dedup": {
                        "type": "boolean",
                        "default": true
                    }
                },
                "required": ["role", "content"],
                "additionalProperties": false
            }),
        }
    }

    async fn execute(&self, args: Value) -> Result<ToolResult, McpError> {
        let req: AppendRequest = parse_args(args)?;
        let packs = Arc::clone(&self.services.packs);
        let outcome = run_pack(move || packs.append(&req)).await?;
        outcome_result(&outcome)
    }
}
