//! MCP protocol unit tests

#[cfg(test)]
mod tests {
    use serde_json::json;
    use kmgr::mcp::protocol::*;
    use kmgr::mcp::transport::is_silent;

    #[test]
    fn test_parse_initialize_request() {
        let json = r#"{
            "jsonrpc": "2.0",
            "id": 1,
            "method": "initialize",
            "params": {
                "protocolVersion": "2024-11-05",
                "capabilities": {"tools": {}},
                "clientInfo": {
                    "name": "test",
                    "version": "1.0"
                }
            }
        }"#;

        let req: JsonRpcRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.method, "initialize");
        assert_eq!(req.jsonrpc, "2.0");
        assert!(req.id.is_some());

        let params: InitializeParams = serde_json::from_value(req.params.unwrap()).unwrap();
        assert_eq!(params.protocol_version, "2024-11-05");
        assert_eq!(params.client_info.unwrap().name, "test");
    }

    #[test]
    fn test_parse_notification_without_id() {
        let json = r#"{"jsonrpc": "2.0", "method": "notifications/initialized"}"#;

        let req: JsonRpcRequest = serde_json::from_str(json).unwrap();
        assert!(req.id.is_none());
        assert!(req.params.is_none());
    }

    #[test]
    fn test_parse_tool_call_params() {
        let params: ToolCallParams = serde_json::from_value(json!({
            "name": "build_pack",
            "arguments": {"repo": "demo"}
        }))
        .unwrap();

        assert_eq!(params.name, "build_pack");
        assert_eq!(params.arguments["repo"], "demo");
    }

    #[test]
    fn test_tool_result_error_flag_serialization() {
        let ok = ToolResult {
            content: vec![ContentBlock::Text {
                text: "done".to_string(),
            }],
            is_error: false,
        };
        let value = serde_json::to_value(&ok).unwrap();
        assert_eq!(value["content"][0]["type"], "text");
        assert!(value.get("isError").is_none());

        let failed = ToolResult {
            is_error: true,
            ..ok
        };
        let value = serde_json::to_value(&failed).unwrap();
        assert_eq!(value["isError"], true);
    }

    #[test]
    fn test_error_response_serialization() {
        let response = JsonRpcResponse {
            jsonrpc: "2.0".to_string(),
            id: Some(json!(7)),
            result: None,
            error: Some(JsonRpcError {
                code: METHOD_NOT_FOUND,
                message: "Unknown method: nope".to_string(),
                data: None,
            }),
        };

        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["error"]["code"], -32601);
        assert!(value.get("result").is_none());
        assert!(!is_silent(&response));
    }
}
