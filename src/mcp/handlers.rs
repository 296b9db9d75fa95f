//! MCP protocol method handlers

use crate::core::services::Services;
use crate::mcp::error::McpError;
use crate::mcp::protocol::*;
use crate::mcp::tools::{
    AppendChatHandler, BuildPackHandler, ExportContextHandler, PingHandler, SetRepoAliasHandler,
    ToolRegistry,
};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

pub struct ProtocolHandlers {
    initialized: AtomicBool,
    tool_registry: ToolRegistry,
}

impl ProtocolHandlers {
    pub fn new(services: Arc<Services>) -> Self {
        let mut registry = ToolRegistry::new();

        registry.register(Arc::new(SetRepoAliasHandler::new(Arc::clone(&services))));
        registry.register(Arc::new(BuildPackHandler::new(Arc::clone(&services))));
        registry.register(Arc::new(AppendChatHandler::new(Arc::clone(&services))));
        registry.register(Arc::new(ExportContextHandler::new(Arc::clone(&services))));
        registry.register(Arc::new(PingHandler::new(services)));

        Self {
            initialized: AtomicBool::new(false),
            tool_registry: registry,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    /// Handle initialize request
    pub async fn handle_initialize(
        &self,
        request: JsonRpcRequest,
    ) -> Result<JsonRpcResponse, McpError> {
        let params: InitializeParams =
            serde_json::from_value(request.params.unwrap_or_else(|| json!({})))
                .map_err(|e| McpError::InvalidParams(format!("Invalid initialize params: {e}")))?;

        let client = params.client_info.unwrap_or_default();
        info!(
            client = %client.name,
            client_version = %client.version,
            protocol = %params.protocol_version,
            "Client initialized"
        );

        let result = InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: ToolsCapability {
                    list_changed: false,
                },
            },
            server_info: ServerInfo {
                name: "kmgr-mcp".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        };

        Ok(success(request.id, serde_json::to_value(result)?))
    }

    /// Handle initialized notification
    pub async fn handle_initialized(
        &self,
        _request: JsonRpcRequest,
    ) -> Result<JsonRpcResponse, McpError> {
        self.initialized.store(true, Ordering::SeqCst);
        info!("Server initialized");

        Ok(notification_ack())
    }

    /// Handle tools/list request
    pub async fn handle_tools_list(
        &self,
        request: JsonRpcRequest,
    ) -> Result<JsonRpcResponse, McpError> {
        let tools = self.tool_registry.list();
        Ok(success(request.id, json!({ "tools": tools })))
    }

    /// Handle tools/call request
    ///
    /// Argument errors become JSON-RPC errors. Pack operation failures
    /// are returned as a normal result carrying the failed envelope.
    pub async fn handle_tools_call(
        &self,
        request: JsonRpcRequest,
    ) -> Result<JsonRpcResponse, McpError> {
        let Some(params_value) = request.params.clone() else {
            return Ok(error_response(
                request.id,
                INVALID_PARAMS,
                "Missing params".to_string(),
            ));
        };

        let params: ToolCallParams = match serde_json::from_value(params_value) {
            Ok(p) => p,
            Err(e) => {
                return Ok(error_response(
                    request.id,
                    INVALID_PARAMS,
                    format!("Invalid params: {e}"),
                ));
            }
        };

        let Some(handler) = self.tool_registry.get(&params.name) else {
            return Ok(error_response(
                request.id,
                INVALID_REQUEST,
                format!("Tool not found: {}", params.name),
            ));
        };

        info!(tool = %params.name, "Tool call");
        match handler.execute(params.arguments).await {
            Ok(result) => Ok(success(request.id, serde_json::to_value(result)?)),
            Err(e) => {
                let (code, message) = e.to_rpc();
                Ok(error_response(request.id, code, message))
            }
        }
    }

    /// Handle ping request
    pub async fn handle_ping(&self, request: JsonRpcRequest) -> Result<JsonRpcResponse, McpError> {
        Ok(success(request.id, json!({})))
    }
}

fn success(id: Option<Value>, result: Value) -> JsonRpcResponse {
    JsonRpcResponse {
        jsonrpc: "2.0".to_string(),
        id,
        result: Some(result),
        error: None,
    }
}

/// Empty response; the transport drops it instead of writing
pub fn notification_ack() -> JsonRpcResponse {
    JsonRpcResponse {
        jsonrpc: "2.0".to_string(),
        id: None,
        result: None,
        error: None,
    }
}

/// Create an error response with proper structure
pub fn error_response(id: Option<Value>, code: i32, message: String) -> JsonRpcResponse {
    JsonRpcResponse {
        jsonrpc: "2.0".to_string(),
        id,
        result: None,
        error: Some(JsonRpcError {
            code,
            message,
            data: None,
        }),
    }
}
