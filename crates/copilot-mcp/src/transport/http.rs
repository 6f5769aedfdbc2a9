//! Streamable HTTP transport.

use async_trait::async_trait;
use copilot_core::McpClientError;
use futures_util::StreamExt;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap};
use serde_json::Value;

use super::{REQUEST_TIMEOUT, SseEventDecoder, Transport, connect_error, is_event_stream_content_type};
use crate::protocol::{JsonRpcRequest, JsonRpcResponse, as_response};

/// Session header assigned by the server on `initialize`.
pub const SESSION_HEADER: &str = "mcp-session-id";

/// POST-per-message transport.
pub struct StreamableHttpTransport {
    server: String,
    client: reqwest::Client,
    url: String,
    headers: HeaderMap,
    session_id: Option<String>,
    closed: bool,
}

impl StreamableHttpTransport {
    pub fn new(server: impl Into<String>, client: reqwest::Client, url: impl Into<String>, headers: HeaderMap) -> Self {
        Self {
            server: server.into(),
            client,
            url: url.into(),
            headers,
            session_id: None,
            closed: false,
        }
    }

    /// Session id captured from the server, if any.
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    async fn post(&mut self, body: &Value) -> Result<reqwest::Response, McpClientError> {
        if self.closed {
            return Err(McpClientError::Closed);
        }
        let mut request = self
            .client
            .post(&self.url)
            .headers(self.headers.clone())
            .header(ACCEPT, "application/json, text/event-stream")
            .timeout(REQUEST_TIMEOUT)
            .json(body);
        if let Some(session_id) = &self.session_id {
            request = request.header(SESSION_HEADER, session_id);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                McpClientError::Timeout(method_of(body))
            } else {
                connect_error(&self.server, e)
            }
        })?;

        if let Some(id) = response
            .headers()
            .get(SESSION_HEADER)
            .and_then(|v| v.to_str().ok())
        {
            self.session_id = Some(id.to_string());
        }

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(McpClientError::Protocol(format!(
                "HTTP {status} from '{}': {}",
                self.server,
                body.trim()
            )));
        }
        Ok(response)
    }
}

fn method_of(body: &Value) -> String {
    body.get("method")
        .and_then(Value::as_str)
        .unwrap_or("request")
        .to_string()
}

/// Read an event-stream reply until the response with `id` arrives.
async fn response_from_stream(
    response: reqwest::Response,
    id: u64,
) -> Result<JsonRpcResponse, McpClientError> {
    let mut stream = response.bytes_stream();
    let mut decoder = SseEventDecoder::default();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| McpClientError::Protocol(e.to_string()))?;
        for event in decoder.push(&chunk) {
            if let Some(found) = matching_response(&event.data, id) {
                return Ok(found);
            }
        }
    }
    if let Some(found) = decoder
        .finish()
        .and_then(|event| matching_response(&event.data, id))
    {
        return Ok(found);
    }

    Err(McpClientError::Protocol(
        "Event stream ended without a response".to_string(),
    ))
}

fn matching_response(data: &str, id: u64) -> Option<JsonRpcResponse> {
    as_response(data).filter(|r| r.numeric_id() == Some(id))
}

#[async_trait]
impl Transport for StreamableHttpTransport {
    async fn request(&mut self, request: JsonRpcRequest) -> Result<JsonRpcResponse, McpClientError> {
        let id = request.id;
        let method = request.method.clone();
        let body = serde_json::to_value(&request)
            .map_err(|e| McpClientError::Protocol(e.to_string()))?;
        let response = self.post(&body).await?;

        let is_stream = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(is_event_stream_content_type);

        if is_stream {
            tokio::time::timeout(REQUEST_TIMEOUT, response_from_stream(response, id))
                .await
                .map_err(|_| McpClientError::Timeout(method))?
        } else {
            let text = response
                .text()
                .await
                .map_err(|e| McpClientError::Protocol(e.to_string()))?;
            serde_json::from_str(&text)
                .map_err(|e| McpClientError::Protocol(format!("Invalid JSON-RPC response: {e}")))
        }
    }

    async fn notify(&mut self, message: Value) -> Result<(), McpClientError> {
        self.post(&message).await.map(drop)
    }

    async fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        let Some(session_id) = self.session_id.take() else {
            return;
        };
        let result = self
            .client
            .delete(&self.url)
            .headers(self.headers.clone())
            .header(SESSION_HEADER, &session_id)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await;
        match result {
            Ok(response) => tracing::debug!(
                server = %self.server,
                status = %response.status(),
                "Closed MCP HTTP session"
            ),
            Err(e) => tracing::debug!(server = %self.server, error = %e, "Failed to close MCP HTTP session"),
        }
    }
}
