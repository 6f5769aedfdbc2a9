//! Fakes for the MCP connector and the chat model.

use std::io;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Bytes;
use copilot_axum::llm::{ByteStream, ChatModelError, ChatModelPort, ChatModelRequest};
use copilot_core::{
    McpClientError, McpConnectTarget, McpConnector, McpSession, McpTool, McpToolResult,
};
use futures_util::StreamExt;
use serde_json::Value;

/// What the fakes saw.
#[derive(Default)]
pub struct Journal {
    pub connected: Mutex<Vec<McpConnectTarget>>,
    pub closed: Mutex<Vec<String>>,
    pub requests: Mutex<Vec<ChatModelRequest>>,
}

/// Refuses servers whose name starts with `down`; others expose two tools.
pub struct FakeConnector {
    journal: Arc<Journal>,
}

impl FakeConnector {
    pub fn new(journal: Arc<Journal>) -> Self {
        Self { journal }
    }
}

struct FakeSession {
    name: String,
    journal: Arc<Journal>,
}

#[async_trait]
impl McpConnector for FakeConnector {
    async fn connect(&self, target: &McpConnectTarget) -> Result<Box<dyn McpSession>, McpClientError> {
        if target.server_name.starts_with("down") {
            return Err(McpClientError::Connect {
                server: target.server_name.clone(),
                message: "connection refused".into(),
            });
        }
        self.journal.connected.lock().unwrap().push(target.clone());
        Ok(Box::new(FakeSession {
            name: target.server_name.clone(),
            journal: Arc::clone(&self.journal),
        }))
    }
}

#[async_trait]
impl McpSession for FakeSession {
    fn server_name(&self) -> &str {
        &self.name
    }

    async fn list_tools(&mut self) -> Result<Vec<McpTool>, McpClientError> {
        Ok(vec![McpTool::new("list_sites"), McpTool::new("get_item")])
    }

    async fn call_tool(&mut self, _name: &str, _arguments: Value) -> Result<McpToolResult, McpClientError> {
        Ok(McpToolResult::success(Value::Null))
    }

    async fn close(&mut self) {
        self.journal.closed.lock().unwrap().push(self.name.clone());
    }
}

/// How the fake model answers.
#[derive(Clone, Default)]
pub enum Reply {
    /// Two event-stream chunks, then the end of the stream.
    #[default]
    Chunks,
    /// One chunk, then a stream that never ends.
    Endless,
    Fail,
}

#[derive(Default)]
pub struct FakeChatModel {
    reply: Reply,
    journal: Option<Arc<Journal>>,
}

impl FakeChatModel {
    pub fn replying(reply: Reply) -> Self {
        Self { reply, journal: None }
    }

    pub fn with_journal(mut self, journal: Arc<Journal>) -> Self {
        self.journal = Some(journal);
        self
    }
}

#[async_trait]
impl ChatModelPort for FakeChatModel {
    async fn stream_chat(&self, request: ChatModelRequest) -> Result<ByteStream, ChatModelError> {
        if let Some(journal) = &self.journal {
            journal.requests.lock().unwrap().push(request);
        }
        match self.reply {
            Reply::Chunks => Ok(futures_util::stream::iter(vec![
                Ok::<_, io::Error>(Bytes::from_static(b"data: {\"delta\":\"Hello\"}\n\n")),
                Ok(Bytes::from_static(b"data: [DONE]\n\n")),
            ])
            .boxed()),
            Reply::Endless => Ok(futures_util::stream::once(async {
                Ok::<_, io::Error>(Bytes::from_static(b"data: {\"delta\":\"partial\"}\n\n"))
            })
            .chain(futures_util::stream::pending())
            .boxed()),
            Reply::Fail => Err(ChatModelError::Upstream {
                status: 401,
                body: "invalid api key".into(),
            }),
        }
    }
}
