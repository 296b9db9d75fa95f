//! Pack build tool handler

use super::handler::McpToolHandler;
use super::helpers::{outcome_result, parse_args, run_pack};
use crate::core::pack::BuildRequest;
use crate::core::services::Services;
use crate::mcp::error::McpError;
use crate::mcp::protocol::{ToolResult, ToolSchema};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

/// Handler for build_pack MCP tool
pub struct BuildPackHandler {
    services: Arc<Services>,
}

impl BuildPackHandler {
    pub fn new(services: Arc<Services>) -> Self {
        Self { services }
    }
}

#[async_trait]
impl McpToolHandler for BuildPackHandler {
    fn name(&self) -> &str {
        "build_pack"
    }

    fn schema(&self) -> ToolSchema {
        let packs = &self.services.config.packs;
        ToolSchema {
            name: "build_pack".to_string(),
            description: "Snapshot a repository into its knowledge pack, replacing any previous \
                          snapshot and chat log. Files are selected by name globs; listed \
                          directory names are skipped anywhere in the tree. Fails without \
                          touching the existing pack when nothing matches or the result exceeds \
                          max_pack_mb."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "repo": {
                        "type": "string",
                        "description": "Alias or directory path (default: configured/default alias)"
                    },
                    "max_pack_mb": {
                        "type": "integer",
                        "minimum": 1,
                        "default": packs.max_pack_mb,
                        "description": "Size ceiling for the pack in MB"
                    },
                    "include": {
                        "type": "array",
                        "items": {"type": "string"},
                        "default": packs.include_patterns,
                        "description": "File name globs to include"
                    },
                    "exclude_dirs": {
                        "type": "array",
                        "items": {"type": "string"},
                        "default": packs.exclude_dirs,
                        "description": "Directory names to skip (case-insensitive)"
                    }
                },
                "additionalProperties": false
            }),
        }
    }

    async fn execute(&self, args: Value) -> Result<ToolResult, McpError> {
        let req: BuildRequest = parse_args(args)?;
        let packs = Arc::clone(&self.services.packs);
        let outcome = run_pack(move || packs.build(&req)).await?;
        outcome_result(&outcome)
    }
}
