//! Legacy HTTP+SSE transport.
//!
//! The client opens a GET event stream; the server's first `endpoint` event
//! names the URL to POST messages to. Responses come back as `message`
//! events on the stream and are routed to waiting requests by id.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use copilot_core::McpClientError;
use futures_util::StreamExt;
use reqwest::header::{ACCEPT, HeaderMap};
use serde_json::Value;
use tokio::sync::{Mutex, oneshot};
use tokio::task::JoinHandle;

use super::{REQUEST_TIMEOUT, SseEventDecoder, Transport, connect_error};
use crate::protocol::{JsonRpcRequest, JsonRpcResponse, as_response};

type Pending = Arc<Mutex<HashMap<u64, oneshot::Sender<JsonRpcResponse>>>>;

/// GET stream + POST endpoint transport.
pub struct LegacySseTransport {
    server: String,
    client: reqwest::Client,
    endpoint: reqwest::Url,
    headers: HeaderMap,
    pending: Pending,
    reader: Option<JoinHandle<()>>,
}

impl LegacySseTransport {
    /// Open the event stream and wait for the `endpoint` event.
    pub async fn connect(
        server: impl Into<String>,
        client: reqwest::Client,
        url: &str,
        headers: HeaderMap,
    ) -> Result<Self, McpClientError> {
        let server = server.into();
        let base = reqwest::Url::parse(url).map_err(|e| connect_error(&server, e))?;

        let response = client
            .get(base.clone())
            .headers(headers.clone())
            .header(ACCEPT, "text/event-stream")
            .send()
            .await
            .map_err(|e| connect_error(&server, e))?;
        if !response.status().is_success() {
            return Err(connect_error(
                &server,
                format!("event stream returned HTTP {}", response.status()),
            ));
        }

        let mut stream = Box::pin(response.bytes_stream());
        let mut decoder = SseEventDecoder::default();

        let endpoint = tokio::time::timeout(REQUEST_TIMEOUT, async {
            while let Some(chunk) = stream.next().await {
                let chunk = chunk.map_err(|e| connect_error(&server, e))?;
                for event in decoder.push(&chunk) {
                    if event.event.as_deref() == Some("endpoint") {
                        return base
                            .join(event.data.trim())
                            .map_err(|e| connect_error(&server, e));
                    }
                }
            }
            Err(connect_error(&server, "event stream closed before the endpoint event"))
        })
        .await
        .map_err(|_| McpClientError::Timeout("endpoint".to_string()))??;

        tracing::debug!(server = %server, endpoint = %endpoint, "MCP SSE endpoint announced");

        let pending: Pending = Arc::new(Mutex::new(HashMap::new()));
        let reader_pending = Arc::clone(&pending);
        let reader_server = server.clone();
        let reader = tokio::spawn(async move {
            while let Some(chunk) = stream.next().await {
                let Ok(chunk) = chunk else {
                    break;
                };
                for event in decoder.push(&chunk) {
                    if !event.is_message() {
                        continue;
                    }
                    let Some(response) = as_response(&event.data) else {
                        continue;
                    };
                    let Some(id) = response.numeric_id() else {
                        continue;
                    };
                    if let Some(tx) = reader_pending.lock().await.remove(&id) {
                        let _ = tx.send(response);
                    }
                }
            }
            tracing::debug!(server = %reader_server, "MCP SSE stream ended");
            reader_pending.lock().await.clear();
        });

        Ok(Self {
            server,
            client,
            endpoint,
            headers,
            pending,
            reader: Some(reader),
        })
    }

    async fn post(&self, body: &Value) -> Result<(), McpClientError> {
        if self.reader.is_none() {
            return Err(McpClientError::Closed);
        }
        let response = self
            .client
            .post(self.endpoint.clone())
            .headers(self.headers.clone())
            .timeout(REQUEST_TIMEOUT)
            .json(body)
            .send()
            .await
            .map_err(|e| connect_error(&self.server, e))?;
        if !response.status().is_success() {
            return Err(McpClientError::Protocol(format!(
                "HTTP {} from '{}' message endpoint",
                response.status(),
                self.server
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl Transport for LegacySseTransport {
    async fn request(&mut self, request: JsonRpcRequest) -> Result<JsonRpcResponse, McpClientError> {
        let id = request.id;
        let method = request.method.clone();
        let body = serde_json::to_value(&request)
            .map_err(|e| McpClientError::Protocol(e.to_string()))?;

        let (tx, rx) = oneshot::channel();
        self.pending.lock().await.insert(id, tx);

        if let Err(e) = self.post(&body).await {
            self.pending.lock().await.remove(&id);
            return Err(e);
        }

        match tokio::time::timeout(REQUEST_TIMEOUT, rx).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(_)) => Err(McpClientError::Protocol(
                "Event stream closed before the response arrived".to_string(),
            )),
            Err(_) => {
                self.pending.lock().await.remove(&id);
                Err(McpClientError::Timeout(method))
            }
        }
    }

    async fn notify(&mut self, message: Value) -> Result<(), McpClientError> {
        self.post(&message).await
    }

    async fn close(&mut self) {
        if let Some(reader) = self.reader.take() {
            reader.abort();
            self.pending.lock().await.clear();
            tracing::debug!(server = %self.server, "Closed MCP SSE stream");
        }
    }
}

impl Drop for LegacySseTransport {
    fn drop(&mut self) {
        if let Some(reader) = self.reader.take() {
            reader.abort();
        }
    }
}
