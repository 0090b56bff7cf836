use anyhow::Result;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::transport::{Inbound, StdioTransport};
use super::types::*;
use crate::extractor::{Extractor, ExtractorConfig};
use crate::tools::{
    detect_file_type_tool::{DetectFileTypeTool, DETECT_FILE_TYPE_TOOL_DEFINITION},
    extract_file_text_tool::{ExtractFileTextTool, EXTRACT_FILE_TEXT_TOOL_DEFINITION},
};

/// Default number of characters returned by `extract-file-text`.
pub const DEFAULT_MAX_LENGTH: usize = 30000;

#[derive(Debug, Clone, Copy)]
pub struct ServerConfig {
    pub extractor: ExtractorConfig,
    pub max_length: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            extractor: ExtractorConfig::default(),
            max_length: DEFAULT_MAX_LENGTH,
        }
    }
}

pub struct McpServer {
    config: ServerConfig,
}

impl McpServer {
    pub fn new(config: ServerConfig) -> Self {
        Self { config }
    }

    pub async fn start(&mut self) -> Result<()> {
        let mut transport = StdioTransport::new();
        info!("MCP server started and listening on stdio");

        loop {
            match transport.read_message().await? {
                Some(Inbound::Message(McpMessage::Request(request))) => {
                    let response = self.handle_request(request).await;
                    transport.write_response(response).await?;
                }
                Some(Inbound::Message(McpMessage::Notification(notification))) => {
                    self.handle_notification(notification).await;
                }
                Some(Inbound::Invalid(e)) => {
                    let response = McpResponse::failure(Value::Null, PARSE_ERROR, e.to_string());
                    transport.write_response(response).await?;
                }
                None => {
                    info!("Client disconnected");
                    break;
                }
            }
        }

        Ok(())
    }

    async fn handle_request(&mut self, request: McpRequest) -> McpResponse {
        let id = Self::ensure_valid_id(request.id);

        match request.method.as_str() {
            "initialize" => self.handle_initialize(id, request.params),
            "tools/list" => self.handle_list_tools(id),
            "tools/call" => self.handle_call_tool(id, request.params).await,
            "ping" => McpResponse::success(id, serde_json::json!({})),
            _ => McpResponse::failure(id, METHOD_NOT_FOUND, "Method not found"),
        }
    }

    async fn handle_notification(&self, notification: McpNotification) {
        debug!("Received notification: {}", notification.method);

        match notification.method.as_str() {
            "notifications/initialized" => {
                info!("Client initialization completed");
            }
            "notifications/cancelled" => {
                debug!("Request cancelled notification received");
            }
            _ => {
                warn!("Unknown notification method: {}", notification.method);
            }
        }
    }

    fn ensure_valid_id(id: Option<Value>) -> Value {
        match id {
            Some(Value::Null) | None => Value::String("0".to_string()),
            Some(value) => value,
        }
    }

    fn handle_initialize(&self, id: Value, params: Option<Value>) -> McpResponse {
        let Some(params) = params else {
            return McpResponse::failure(id, INVALID_PARAMS, "Missing params");
        };
        let init = match serde_json::from_value::<InitializeParams>(params) {
            Ok(init) => init,
            Err(e) => {
                return McpResponse::failure(id, INVALID_PARAMS, format!("Invalid params: {}", e))
            }
        };
        info!(
            "Initializing session for {} {} (protocol {})",
            init.client_info.name, init.client_info.version, init.protocol_version
        );

        let result = InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            server_info: ServerInfo {
                name: "File Text Extraction MCP".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                description: Some(
                    "A Model Context Protocol server that detects text files and extracts their content, including PDF page text"
                        .to_string(),
                ),
            },
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: Some(false),
                }),
                logging: Some(serde_json::json!({})),
            },
        };
        McpResponse::from_serializable(id, &result)
    }

    fn handle_list_tools(&self, id: Value) -> McpResponse {
        let result = ListToolsResult {
            tools: vec![
                EXTRACT_FILE_TEXT_TOOL_DEFINITION.clone(),
                DETECT_FILE_TYPE_TOOL_DEFINITION.clone(),
            ],
        };
        McpResponse::from_serializable(id, &result)
    }

    async fn handle_call_tool(&self, id: Value, params: Option<Value>) -> McpResponse {
        let Some(params) = params else {
            return McpResponse::failure(id, INVALID_PARAMS, "Missing params");
        };
        match serde_json::from_value::<CallToolParams>(params) {
            Ok(call_params) => {
                let result = self.execute_tool(call_params).await;
                McpResponse::from_serializable(id, &result)
            }
            Err(e) => McpResponse::failure(id, INVALID_PARAMS, format!("Invalid params: {}", e)),
        }
    }

    async fn execute_tool(&self, params: CallToolParams) -> CallToolResult {
        match params.name.as_str() {
            "extract-file-text" => {
                let tool = ExtractFileTextTool::new(
                    Extractor::new(self.config.extractor),
                    self.config.max_length,
                );
                tool.execute(params.arguments).await
            }
            "detect-file-type" => {
                let tool = DetectFileTypeTool::new();
                tool.execute(params.arguments).await
            }
            _ => CallToolResult::error(format!("Tool not found: {}", params.name)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn request(id: Value, method: &str, params: Option<Value>) -> McpRequest {
        McpRequest {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id: Some(id),
            method: method.to_string(),
            params,
        }
    }

    #[tokio::test]
    async fn initialize_reports_server_info() {
        let mut server = McpServer::new(ServerConfig::default());
        let params = json!({
            "protocolVersion": PROTOCOL_VERSION,
            "clientInfo": {"name": "test-client", "version": "1.0"}
        });
        let response = server
            .handle_request(request(json!(1), "initialize", Some(params)))
            .await;
        let result = response.result.expect("initialize result");
        assert_eq!(result["protocolVersion"], json!(PROTOCOL_VERSION));
        assert_eq!(result["serverInfo"]["version"], json!(env!("CARGO_PKG_VERSION")));
    }

    #[tokio::test]
    async fn initialize_without_params_is_invalid() {
        let mut server = McpServer::new(ServerConfig::default());
        let response = server.handle_request(request(json!(1), "initialize", None)).await;
        assert_eq!(response.error.map(|e| e.code), Some(INVALID_PARAMS));
    }

    #[tokio::test]
    async fn lists_both_tools() {
        let mut server = McpServer::new(ServerConfig::default());
        let response = server.handle_request(request(json!("a"), "tools/list", None)).await;
        let result = response.result.expect("tools/list result");
        let names: Vec<&str> = result["tools"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["extract-file-text", "detect-file-type"]);
        assert_eq!(response.id, json!("a"));
    }

    #[tokio::test]
    async fn calls_extract_tool() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hello.txt");
        std::fs::write(&path, "hello from disk").unwrap();

        let mut server = McpServer::new(ServerConfig::default());
        let params = json!({
            "name": "extract-file-text",
            "arguments": {"path": path.to_string_lossy()}
        });
        let response = server
            .handle_request(request(json!(3), "tools/call", Some(params)))
            .await;
        let result = response.result.expect("tools/call result");
        assert!(result.get("isError").is_none());
        assert!(result["content"][0]["text"]
            .as_str()
            .unwrap()
            .starts_with("hello from disk"));
    }

    #[tokio::test]
    async fn unknown_tool_and_method() {
        let mut server = McpServer::new(ServerConfig::default());
        let params = json!({"name": "web-search", "arguments": {}});
        let response = server
            .handle_request(request(json!(4), "tools/call", Some(params)))
            .await;
        assert_eq!(response.result.unwrap()["isError"], json!(true));

        let response = server.handle_request(request(json!(5), "resources/list", None)).await;
        assert_eq!(response.error.map(|e| e.code), Some(METHOD_NOT_FOUND));
    }

    #[tokio::test]
    async fn null_id_is_replaced() {
        let mut server = McpServer::new(ServerConfig::default());
        let response = server.handle_request(request(Value::Null, "ping", None)).await;
        assert_eq!(response.id, json!("0"));
    }

    #[tokio::test]
    async fn tools_are_callable_before_initialized_notification() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("early.txt");
        std::fs::write(&path, "early").unwrap();
        let params = json!({
            "name": "extract-file-text",
            "arguments": {"path": path.to_string_lossy()}
        });

        let mut server = McpServer::new(ServerConfig::default());
        let before = server
            .handle_request(request(json!(6), "tools/call", Some(params.clone())))
            .await;
        server
            .handle_notification(McpNotification {
                jsonrpc: JSONRPC_VERSION.to_string(),
                method: "notifications/initialized".to_string(),
                params: None,
            })
            .await;
        let after = server
            .handle_request(request(json!(7), "tools/call", Some(params)))
            .await;

        assert_eq!(before.result, after.result);
        assert!(before.result.unwrap()["content"][0]["text"]
            .as_str()
            .unwrap()
            .starts_with("early"));
    }
}
