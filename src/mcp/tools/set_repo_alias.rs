//! Alias registration tool handler

use super::handler::McpToolHandler;
use super::helpers::{outcome_result, parse_args, run_pack};
use crate::core::services::Services;
use crate::mcp::error::McpError;
use crate::mcp::protocol::{ToolResult, ToolSchema};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
struct SetAliasRequest {
    alias: String,
    path: PathBuf,
    #[serde(default, rename = "default")]
    make_default: bool,
}

/// Handler for set_repo_alias MCP tool
pub struct SetRepoAliasHandler {
    services: Arc<Services>,
}

impl SetRepoAliasHandler {
    pub fn new(services: Arc<Services>) -> Self {
        Self { services }
    }
}

#[async_trait]
impl McpToolHandler for SetRepoAliasHandler {
    fn name(&self) -> &str {
        "set_repo_alias"
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "set_repo_alias".to_string(),
            description: "Register a short alias for a repository directory. Other pack tools \
                          accept the alias as `repo`. With default=true the alias is used when \
                          `repo` is omitted."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "alias": {
                        "type": "string",
                        "pattern": "^[A-Za-z0-9._-]{1,64}$",
                        "description": "Alias name"
                    },
                    "path": {
                        "type": "string",
                        "description": "Existing repository directory"
                    },
                    "default": {
                        "type": "boolean",
                        "default": false,
                        "description": "Make this the default repository"
                    }
                },
                "required": ["alias", "path"],
                "additionalProperties": false
            }),
        }
    }

    async fn execute(&self, args: Value) -> Result<ToolResult, McpError> {
        let req: SetAliasRequest = parse_args(args)?;
        let packs = Arc::clone(&self.services.packs);
        let outcome =
            run_pack(move || packs.set_repo_alias(&req.alias, &req.path, req.make_default)).await?;
        outcome_result(&outcome)
    }
}
