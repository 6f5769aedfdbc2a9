//! JSON-RPC 2.0 message types for the MCP wire protocol.
//!
//! Reference: <https://spec.modelcontextprotocol.io/>

use copilot_core::{McpClientError, McpTool, McpToolResult};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Protocol revision sent in `initialize`.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// JSON-RPC 2.0 request.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl JsonRpcRequest {
    pub fn new(id: u64, method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            method: method.into(),
            params,
        }
    }
}

/// JSON-RPC 2.0 notification (no id, no response).
pub fn notification(method: &str) -> Value {
    json!({
        "jsonrpc": "2.0",
        "method": method,
        "params": {}
    })
}

/// JSON-RPC 2.0 response.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcResponse {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    /// Numeric id, when the server echoed one.
    pub fn numeric_id(&self) -> Option<u64> {
        match self.id.as_ref()? {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// Unwrap the `result`, turning an `error` object into an error.
    pub fn into_result(self) -> Result<Value, McpClientError> {
        if let Some(err) = self.error {
            return Err(McpClientError::Rpc {
                code: err.code,
                message: err.message,
            });
        }
        self.result
            .ok_or_else(|| McpClientError::Protocol("Missing result in response".to_string()))
    }
}

/// JSON-RPC 2.0 error.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
}

/// Try to read a response out of an arbitrary JSON-RPC message.
///
/// Requests and notifications from the server have a `method` and are not
/// responses.
pub fn as_response(message: &str) -> Option<JsonRpcResponse> {
    let value: Value = serde_json::from_str(message).ok()?;
    if value.get("method").is_some() {
        return None;
    }
    serde_json::from_value(value).ok()
}

/// `initialize` parameters.
pub fn initialize_params() -> Value {
    json!({
        "protocolVersion": PROTOCOL_VERSION,
        "clientInfo": {
            "name": "sitecore-copilot",
            "version": env!("CARGO_PKG_VERSION")
        },
        "capabilities": {}
    })
}

/// Server information from initialize.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
}

/// MCP initialize result.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
    #[serde(default)]
    pub protocol_version: String,
    #[serde(default)]
    pub server_info: ServerInfo,
    #[serde(default)]
    pub capabilities: Value,
}

impl InitializeResult {
    /// Servers omitting the `tools` capability expose no tools.
    pub fn supports_tools(&self) -> bool {
        self.capabilities.get("tools").is_some()
    }
}

/// Parse a `tools/list` result.
pub fn parse_tool_list(result: Value) -> Result<Vec<McpTool>, McpClientError> {
    let tools = result.get("tools").cloned().unwrap_or_else(|| json!([]));
    serde_json::from_value(tools)
        .map_err(|e| McpClientError::Protocol(format!("Invalid tools/list result: {e}")))
}

/// Parse a `tools/call` result.
///
/// MCP returns a `content` array; `isError` marks tool-level failures whose
/// message is the first text item.
pub fn parse_tool_call(result: &Value) -> McpToolResult {
    let content = result.get("content").cloned().unwrap_or_else(|| json!([]));
    let is_error = result
        .get("isError")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    if is_error {
        let message = content
            .as_array()
            .and_then(|items| items.first())
            .and_then(|item| item.get("text"))
            .and_then(Value::as_str)
            .unwrap_or("Unknown error");
        McpToolResult::error(message)
    } else {
        McpToolResult::success(content)
    }
}
