//! Chat endpoint.
//!
//! POST /api/chat picks the credential for the model, routes the request to
//! a product prompt, opens the MCP tool session and streams the provider's
//! response back. The tool session stays open while the response streams and
//! is closed when the stream ends, hits the duration cap, or is dropped by a
//! disconnecting client. A failed model call closes it right away. Any
//! failure is a plain-text 500.

use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use copilot_core::services::{product_router, select_token};
use copilot_core::{
    ChatMessage, Instance, McpServer, RegistryError, Token, WorkspaceError,
};
use futures_util::StreamExt;
use serde::Deserialize;
use thiserror::Error;

use crate::llm::{ChatModelError, ChatModelRequest};
use crate::state::AppState;

/// Request body for POST /api/chat.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub instances: Vec<Instance>,
    /// Credential chosen by the browser; the fallback when no stored token
    /// matches the model's provider.
    #[serde(default)]
    pub token_data: Token,
    #[serde(default)]
    pub all_tokens: Vec<Token>,
    pub model: String,
    /// Servers to use; the registry's enabled servers when absent.
    #[serde(default)]
    pub mcp_servers: Option<Vec<McpServer>>,
    #[serde(default)]
    pub product: Option<String>,
}

#[derive(Debug, Error)]
enum ChatError {
    #[error("Invalid chat request: {0}")]
    InvalidRequest(#[from] serde_json::Error),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Workspace(#[from] WorkspaceError),

    #[error(transparent)]
    Model(#[from] ChatModelError),
}

/// POST /api/chat
pub async fn chat(State(state): State<AppState>, body: Bytes) -> Response {
    match stream_chat(&state, &body).await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(error = %e, "Chat request failed");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

async fn stream_chat(state: &AppState, body: &[u8]) -> Result<Response, ChatError> {
    let request: ChatRequest = serde_json::from_slice(body)?;

    let instances = if request.instances.is_empty() {
        state.workspace.list_instances().await?
    } else {
        request.instances
    };
    let tokens = if request.all_tokens.is_empty() {
        state.workspace.list_tokens().await?
    } else {
        request.all_tokens
    };
    let servers = match request.mcp_servers {
        Some(servers) => servers,
        None => state.registry.enabled_servers().await?,
    };

    let token = select_token(&request.model, &request.token_data, &tokens);
    let route = product_router::route(&instances, request.product.as_deref());

    let mut session = state.tools.build(&servers, &tokens, &instances).await;
    tracing::info!(
        model = %request.model,
        product = ?route.product,
        servers = session.server_count(),
        tools = session.tool_names().len(),
        "Chat request"
    );

    let result = state
        .chat_model
        .stream_chat(ChatModelRequest {
            model: request.model,
            api_key: token.token,
            system_prompt: route.system_prompt,
            messages: request.messages,
            tools: session.tools(),
        })
        .await;
    let stream = match result {
        Ok(stream) => stream,
        Err(e) => {
            session.close().await;
            return Err(e.into());
        }
    };

    let deadline = Box::pin(tokio::time::sleep(state.chat_max_duration));
    let body = Body::from_stream(session.close_after(stream.take_until(deadline)));

    Ok(Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/event-stream")
        .header(header::CACHE_CONTROL, "no-cache")
        .header(header::CONNECTION, "keep-alive")
        .body(body)
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response()))
}
