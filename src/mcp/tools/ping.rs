//! Liveness tool handler
//!
//! Reports the server version and where packs are stored.

use super::handler::McpToolHandler;
use super::helpers::outcome_result;
use crate::core::services::Services;
use crate::core::types::PackOutcome;
use crate::mcp::error::McpError;
use crate::mcp::protocol::{ToolResult, ToolSchema};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

pub struct PingHandler {
    services: Arc<Services>,
}

impl PingHandler {
    pub fn new(services: Arc<Services>) -> Self {
        Self { services }
    }
}

#[async_trait]
impl McpToolHandler for PingHandler {
    fn name(&self) -> &str {
        "ping"
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "ping".to_string(),
            description: "Check that the kmgr tool server is alive. Returns the version and the \
                          packs directory."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {},
                "required": []
            }),
        }
    }

    async fn execute(&self, _args: Value) -> Result<ToolResult, McpError> {
        let packs = &self.services.packs;
        let outcome = PackOutcome::success(
            "ping",
            format!("kmgr-mcp {} ready", env!("CARGO_PKG_VERSION")),
            json!({
                "version": env!("CARGO_PKG_VERSION"),
                "packs_dir": packs.packs_dir(),
                "registry": packs.registry().path(),
            }),
        );
        outcome_result(&outcome)
    }
}
