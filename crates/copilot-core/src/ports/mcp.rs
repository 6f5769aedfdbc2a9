//! MCP connection port.
//!
//! The chat-session orchestrator opens one session per active server through
//! an [`McpConnector`]. Sessions are owned values; whoever opens one must
//! call [`McpSession::close`] on every path.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::domain::{McpTool, McpToolResult, McpTransportType};

/// Everything a connector needs to reach one server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct McpConnectTarget {
    /// Registry name, used as the tool prefix and in logs.
    pub server_name: String,
    pub url: String,
    pub transport: McpTransportType,
    /// Wire headers attached to every request.
    pub headers: Vec<(String, String)>,
}

/// Errors raised while talking to an MCP server.
#[derive(Debug, Error)]
pub enum McpClientError {
    /// The transport could not be established.
    #[error("Failed to connect to MCP server '{server}': {message}")]
    Connect { server: String, message: String },

    /// The server answered with something that is not valid JSON-RPC.
    #[error("MCP protocol error: {0}")]
    Protocol(String),

    /// The server returned a JSON-RPC error object.
    #[error("MCP server error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// No response within the request timeout.
    #[error("MCP request '{0}' timed out")]
    Timeout(String),

    /// The session was already closed.
    #[error("MCP session closed")]
    Closed,
}

/// Opens sessions against MCP servers.
#[async_trait]
pub trait McpConnector: Send + Sync {
    /// Connect and perform the `initialize` handshake.
    async fn connect(&self, target: &McpConnectTarget)
    -> Result<Box<dyn McpSession>, McpClientError>;
}

/// An initialized session with one MCP server.
#[async_trait]
pub trait McpSession: Send {
    /// Name of the server this session talks to.
    fn server_name(&self) -> &str;

    /// `tools/list`.
    async fn list_tools(&mut self) -> Result<Vec<McpTool>, McpClientError>;

    /// `tools/call` with the server's own (unprefixed) tool name.
    async fn call_tool(
        &mut self,
        name: &str,
        arguments: Value,
    ) -> Result<McpToolResult, McpClientError>;

    /// Release transport resources. Calling it twice is a no-op.
    async fn close(&mut self);
}
