//! Chat-session tool assembly.
//!
//! For one chat request: open a session per active server, list its tools,
//! prefix them with the server name and merge everything into one map. A
//! server that fails to connect or list is logged and skipped; the others
//! still contribute. The resulting [`ToolSession`] owns every opened
//! session until the request ends: closed explicitly, closed when the
//! response stream it is attached to finishes, or closed in a background
//! task when dropped early.

use std::collections::BTreeMap;
use std::sync::Arc;

use copilot_core::services::header_resolver;
use futures_util::{Stream, StreamExt, stream};
use copilot_core::{
    Instance, McpClientError, McpConnectTarget, McpConnector, McpServer, McpSession, McpTool,
    McpToolResult, Token,
};
use serde_json::Value;

/// A merged tool: its prefixed definition plus where to route calls.
struct ToolEntry {
    session: usize,
    /// Name on the originating server.
    remote_name: String,
    definition: McpTool,
}

/// Builds [`ToolSession`]s through an [`McpConnector`].
#[derive(Clone)]
pub struct ToolSetBuilder {
    connector: Arc<dyn McpConnector>,
}

impl ToolSetBuilder {
    pub fn new(connector: Arc<dyn McpConnector>) -> Self {
        Self { connector }
    }

    /// Open sessions for the active servers, in list order.
    pub async fn build(&self, servers: &[McpServer], tokens: &[Token], instances: &[Instance]) -> ToolSession {
        let mut session = ToolSession::default();

        for server in servers.iter().filter(|s| s.is_active) {
            let target = McpConnectTarget {
                server_name: server.name.clone(),
                url: server.url.clone(),
                transport: server.transport,
                headers: header_resolver::request_headers(server, tokens, instances),
            };

            let mut client = match self.connector.connect(&target).await {
                Ok(client) => client,
                Err(e) => {
                    tracing::warn!(server = %server.name, error = %e, "Skipping MCP server: connect failed");
                    continue;
                }
            };

            match client.list_tools().await {
                Ok(tools) => {
                    tracing::debug!(server = %server.name, tools = tools.len(), "Loaded MCP tools");
                    session.add(&server.tool_prefix(), client, tools);
                }
                Err(e) => {
                    tracing::warn!(server = %server.name, error = %e, "Skipping MCP server: tools/list failed");
                    client.close().await;
                }
            }
        }

        session
    }
}

/// The sessions and merged tools for one chat request.
#[derive(Default)]
pub struct ToolSession {
    sessions: Vec<Box<dyn McpSession>>,
    tools: BTreeMap<String, ToolEntry>,
}

impl ToolSession {
    fn add(&mut self, prefix: &str, client: Box<dyn McpSession>, tools: Vec<McpTool>) {
        let index = self.sessions.len();
        for tool in tools {
            let name = format!("{prefix}{}", tool.name);
            let entry = ToolEntry {
                session: index,
                remote_name: tool.name.clone(),
                definition: McpTool { name: name.clone(), ..tool },
            };
            if let Some(previous) = self.tools.insert(name.clone(), entry) {
                let replaced = self
                    .sessions
                    .get(previous.session)
                    .map_or_else(|| client.server_name(), |s| s.server_name());
                tracing::warn!(
                    tool = %name,
                    replaced_server = %replaced,
                    "Duplicate MCP tool name; keeping the later definition"
                );
            }
        }
        self.sessions.push(client);
    }

    /// Merged tool definitions with prefixed names, sorted by name.
    pub fn tools(&self) -> Vec<McpTool> {
        self.tools.values().map(|e| e.definition.clone()).collect()
    }

    /// Prefixed tool names, sorted.
    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.keys().map(String::as_str).collect()
    }

    /// Number of servers that contributed a session.
    pub fn server_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Route a prefixed tool call to its server.
    pub async fn call_tool(&mut self, name: &str, arguments: Value) -> Result<McpToolResult, McpClientError> {
        let Some(entry) = self.tools.get(name) else {
            return Ok(McpToolResult::error(format!("Unknown tool: {name}")));
        };
        let remote_name = entry.remote_name.clone();
        self.sessions[entry.session]
            .call_tool(&remote_name, arguments)
            .await
    }

    /// Keep the sessions open until `inner` ends, then close them before
    /// the returned stream finishes.
    pub fn close_after<S>(self, inner: S) -> impl Stream<Item = S::Item> + Send + 'static
    where
        S: Stream + Send + Unpin + 'static,
        S::Item: Send,
    {
        stream::unfold((inner, Some(self)), |(mut inner, mut session)| async move {
            if let Some(item) = inner.next().await {
                return Some((item, (inner, session)));
            }
            if let Some(mut session) = session.take() {
                session.close().await;
            }
            None
        })
    }

    /// Close every session. Safe to call more than once.
    pub async fn close(&mut self) {
        for session in &mut self.sessions {
            session.close().await;
        }
        if !self.sessions.is_empty() {
            tracing::debug!(sessions = self.sessions.len(), "Closed MCP sessions");
        }
        self.sessions.clear();
        self.tools.clear();
    }
}

impl Drop for ToolSession {
    fn drop(&mut self) {
        if self.sessions.is_empty() {
            return;
        }
        let mut sessions = std::mem::take(&mut self.sessions);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    for session in &mut sessions {
                        session.close().await;
                    }
                    tracing::debug!(sessions = sessions.len(), "Closed dropped MCP sessions");
                });
            }
            Err(_) => tracing::warn!(
                sessions = sessions.len(),
                "MCP sessions dropped outside a runtime; not closed"
            ),
        }
    }
}
