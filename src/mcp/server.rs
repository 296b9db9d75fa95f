//! MCP server implementation
//!
//! Reads newline-delimited JSON-RPC messages from stdin and writes
//! responses to stdout. Logging must go to stderr.

use crate::core::services::Services;
use crate::mcp::error::McpError;
use crate::mcp::handlers::{error_response, notification_ack, ProtocolHandlers};
use crate::mcp::protocol::*;
use crate::mcp::transport::StdioTransport;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, error, info};

pub struct McpServer {
    transport: StdioTransport,
    handlers: Arc<ProtocolHandlers>,
}

impl McpServer {
    pub fn new(services: Arc<Services>) -> Self {
        Self {
            transport: StdioTransport::new(),
            handlers: Arc::new(ProtocolHandlers::new(services)),
        }
    }

    /// Run until stdin closes or Ctrl+C
    pub async fn run(&mut self) -> Result<(), McpError> {
        info!("Starting kmgr MCP server");

        let stdin = tokio::io::stdin();
        let mut reader = BufReader::new(stdin).lines();

        let mut shutdown = tokio::spawn(async {
            tokio::signal::ctrl_c().await.ok();
        });

        loop {
            tokio::select! {
                line = reader.next_line() => {
                    match line? {
                        Some(line) if !line.trim().is_empty() => {
                            let response = self.handle_line(&line).await;
                            self.transport.send_response(response).await?;
                        }
                        None => break, // EOF
                        _ => continue,
                    }
                }

                _ = &mut shutdown => {
                    info!("Received shutdown signal");
                    break;
                }
            }
        }

        info!("MCP server shutting down");
        Ok(())
    }

    /// Turn one input line into one response
    ///
    /// Never fails: every error becomes a JSON-RPC error response.
    pub async fn handle_line(&self, line: &str) -> JsonRpcResponse {
        debug!("Received: {}", line);

        let request: JsonRpcRequest = match serde_json::from_str(line) {
            Ok(request) => request,
            Err(e) => return error_response(None, PARSE_ERROR, format!("Parse error: {e}")),
        };
        let id = request.id.clone();

        match self.dispatch(request).await {
            Ok(response) => response,
            Err(e) => {
                error!("Error processing message: {}", e);
                let (code, message) = e.to_rpc();
                error_response(id, code, message)
            }
        }
    }

    async fn dispatch(&self, request: JsonRpcRequest) -> Result<JsonRpcResponse, McpError> {
        match request.method.as_str() {
            "initialize" => self.handlers.handle_initialize(request).await,
            "initialized" | "notifications/initialized" => {
                self.handlers.handle_initialized(request).await
            }
            "tools/list" => self.handlers.handle_tools_list(request).await,
            "tools/call" => self.handlers.handle_tools_call(request).await,
            "ping" => self.handlers.handle_ping(request).await,
            method if request.id.is_none() => {
                debug!("Ignoring notification: {}", method);
                Ok(notification_ack())
            }
            method => Ok(error_response(
                request.id,
                METHOD_NOT_FOUND,
                format!("Unknown method: {method}"),
            )),
        }
    }
}
