//! MCP JSON-RPC client for communicating with MCP servers.
//!
//! Wraps a [`Transport`] with the MCP session lifecycle:
//! `initialize` -> `notifications/initialized` -> `tools/list` / `tools/call`.

use async_trait::async_trait;
use copilot_core::{McpClientError, McpSession, McpTool, McpToolResult};
use serde_json::{Value, json};

use crate::protocol::{
    InitializeResult, JsonRpcRequest, ServerInfo, initialize_params, notification, parse_tool_call,
    parse_tool_list,
};
use crate::transport::Transport;

/// An initialized MCP session over any transport.
pub struct McpClient {
    server_name: String,
    transport: Box<dyn Transport>,
    next_id: u64,
    initialized: InitializeResult,
    closed: bool,
}

impl McpClient {
    /// Perform the `initialize` handshake over `transport`.
    ///
    /// The transport is closed again when the handshake fails.
    pub async fn initialize(
        server_name: impl Into<String>,
        transport: Box<dyn Transport>,
    ) -> Result<Self, McpClientError> {
        let mut client = Self {
            server_name: server_name.into(),
            transport,
            next_id: 1,
            initialized: InitializeResult::default(),
            closed: false,
        };

        match client.handshake().await {
            Ok(()) => Ok(client),
            Err(e) => {
                client.transport.close().await;
                Err(e)
            }
        }
    }

    async fn handshake(&mut self) -> Result<(), McpClientError> {
        let result = self.request("initialize", Some(initialize_params())).await?;
        self.initialized = serde_json::from_value(result)
            .map_err(|e| McpClientError::Protocol(format!("Invalid initialize result: {e}")))?;
        self.transport
            .notify(notification("notifications/initialized"))
            .await?;
        tracing::debug!(
            server = %self.server_name,
            remote = %self.initialized.server_info.name,
            protocol = %self.initialized.protocol_version,
            "MCP session initialized"
        );
        Ok(())
    }

    /// Server info reported by `initialize`.
    pub const fn server_info(&self) -> &ServerInfo {
        &self.initialized.server_info
    }

    async fn request(&mut self, method: &str, params: Option<Value>) -> Result<Value, McpClientError> {
        if self.closed {
            return Err(McpClientError::Closed);
        }
        let id = self.next_id;
        self.next_id += 1;
        self.transport
            .request(JsonRpcRequest::new(id, method, params))
            .await?
            .into_result()
    }
}

#[async_trait]
impl McpSession for McpClient {
    fn server_name(&self) -> &str {
        &self.server_name
    }

    async fn list_tools(&mut self) -> Result<Vec<McpTool>, McpClientError> {
        if !self.initialized.supports_tools() {
            return Ok(Vec::new());
        }
        let result = self.request("tools/list", None).await?;
        parse_tool_list(result)
    }

    async fn call_tool(&mut self, name: &str, arguments: Value) -> Result<McpToolResult, McpClientError> {
        let params = json!({
            "name": name,
            "arguments": arguments
        });
        let result = self.request("tools/call", Some(params)).await?;
        Ok(parse_tool_call(&result))
    }

    async fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.transport.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::JsonRpcResponse;
    use std::sync::{Arc, Mutex};

    /// Scripted transport answering by method name.
    struct ScriptedTransport {
        log: Arc<Mutex<Vec<String>>>,
        tools_capability: bool,
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn request(&mut self, request: JsonRpcRequest) -> Result<JsonRpcResponse, McpClientError> {
            self.log.lock().unwrap().push(request.method.clone());
            let result = match request.method.as_str() {
                "initialize" => {
                    let capabilities = if self.tools_capability {
                        json!({"tools": {}})
                    } else {
                        json!({})
                    };
                    json!({
                        "protocolVersion": "2024-11-05",
                        "serverInfo": {"name": "scripted"},
                        "capabilities": capabilities
                    })
                }
                "tools/list" => json!({"tools": [{"name": "search"}]}),
                "tools/call" => json!({"content": [{"type": "text", "text": "ok"}]}),
                other => return Err(McpClientError::Protocol(format!("unexpected {other}"))),
            };
            Ok(serde_json::from_value(json!({"jsonrpc": "2.0", "id": request.id, "result": result})).unwrap())
        }

        async fn notify(&mut self, message: Value) -> Result<(), McpClientError> {
            self.log.lock().unwrap().push(message["method"].as_str().unwrap().to_string());
            Ok(())
        }

        async fn close(&mut self) {
            self.log.lock().unwrap().push("close".to_string());
        }
    }

    fn transport(tools_capability: bool) -> (Box<dyn Transport>, Arc<Mutex<Vec<String>>>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        (
            Box::new(ScriptedTransport {
                log: Arc::clone(&log),
                tools_capability,
            }),
            log,
        )
    }

    #[tokio::test]
    async fn handshake_then_list_and_call() {
        let (transport, log) = transport(true);
        let mut client = McpClient::initialize("docs", transport).await.unwrap();
        assert_eq!(client.server_info().name, "scripted");

        let tools = client.list_tools().await.unwrap();
        assert_eq!(tools[0].name, "search");
        let result = client.call_tool("search", json!({"q": "x"})).await.unwrap();
        assert!(result.success);

        client.close().await;
        client.close().await;
        assert!(matches!(client.list_tools().await, Err(McpClientError::Closed)));
        assert_eq!(
            *log.lock().unwrap(),
            vec![
                "initialize",
                "notifications/initialized",
                "tools/list",
                "tools/call",
                "close"
            ]
        );
    }

    #[tokio::test]
    async fn server_without_tools_capability_lists_nothing() {
        let (transport, log) = transport(false);
        let mut client = McpClient::initialize("docs", transport).await.unwrap();
        assert!(client.list_tools().await.unwrap().is_empty());
        assert!(!log.lock().unwrap().contains(&"tools/list".to_string()));
    }
}
