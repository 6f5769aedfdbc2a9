//! MCP transports.
//!
//! - [`StreamableHttpTransport`]: every message is a POST; the reply is
//!   either a JSON body or an event stream carrying the response.
//! - [`LegacySseTransport`]: a long-lived GET event stream announces a POST
//!   endpoint; replies arrive on the stream.

mod event_stream;
mod http;
mod sse;

use async_trait::async_trait;
use copilot_core::McpClientError;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;
use std::time::Duration;

use crate::protocol::{JsonRpcRequest, JsonRpcResponse};

pub use event_stream::{SseEvent, SseEventDecoder, is_event_stream_content_type};
pub use http::StreamableHttpTransport;
pub use sse::LegacySseTransport;

/// Time allowed for any single MCP request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// A bidirectional JSON-RPC channel to one server.
#[async_trait]
pub trait Transport: Send {
    /// Send a request and wait for its response.
    async fn request(&mut self, request: JsonRpcRequest) -> Result<JsonRpcResponse, McpClientError>;

    /// Send a notification.
    async fn notify(&mut self, message: Value) -> Result<(), McpClientError>;

    /// Release the channel. Calling it twice is a no-op.
    async fn close(&mut self);
}

/// Convert header pairs to a `HeaderMap`, skipping (and logging) pairs that
/// are not valid HTTP.
pub fn header_map(server: &str, headers: &[(String, String)]) -> HeaderMap {
    let mut map = HeaderMap::new();
    for (key, value) in headers {
        match (
            HeaderName::from_bytes(key.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                map.insert(name, value);
            }
            _ => tracing::warn!(server, header = %key, "Skipping invalid MCP header"),
        }
    }
    map
}

pub(crate) fn connect_error(server: &str, error: impl std::fmt::Display) -> McpClientError {
    McpClientError::Connect {
        server: server.to_string(),
        message: error.to_string(),
    }
}
