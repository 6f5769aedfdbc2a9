//! Chat model port and provider clients.
//!
//! The chat handler hands a [`ChatModelRequest`] to a [`ChatModelPort`] and
//! streams the provider's event stream back unchanged. [`ProviderChatModel`]
//! picks the `OpenAI` or Anthropic client from the model id.

mod anthropic;
mod openai;

use std::io;

use async_trait::async_trait;
use axum::body::Bytes;
use copilot_core::services::provider_for_model;
use copilot_core::{ChatMessage, McpTool, Provider};
use futures_util::StreamExt;
use futures_util::stream::BoxStream;
use thiserror::Error;

/// Raw provider response body.
pub type ByteStream = BoxStream<'static, Result<Bytes, io::Error>>;

/// Everything a provider needs for one streamed completion.
#[derive(Debug, Clone)]
pub struct ChatModelRequest {
    pub model: String,
    pub api_key: String,
    pub system_prompt: String,
    pub messages: Vec<ChatMessage>,
    /// Prefixed MCP tools advertised to the model.
    pub tools: Vec<McpTool>,
}

/// Errors from a chat model call.
#[derive(Debug, Error)]
pub enum ChatModelError {
    #[error("Unsupported model: {0}")]
    UnsupportedModel(String),

    #[error("No API key configured for {0}")]
    MissingApiKey(Provider),

    #[error("Provider request failed: {0}")]
    Request(String),

    #[error("Provider returned {status}: {body}")]
    Upstream { status: u16, body: String },
}

/// Streams a chat completion from a model provider.
#[async_trait]
pub trait ChatModelPort: Send + Sync {
    async fn stream_chat(&self, request: ChatModelRequest) -> Result<ByteStream, ChatModelError>;
}

/// Default API roots.
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com/v1";

/// Dispatches to the provider inferred from the model id.
#[derive(Clone)]
pub struct ProviderChatModel {
    client: reqwest::Client,
    openai_base_url: String,
    anthropic_base_url: String,
}

impl ProviderChatModel {
    pub fn new(
        client: reqwest::Client,
        openai_base_url: impl Into<String>,
        anthropic_base_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            openai_base_url: openai_base_url.into(),
            anthropic_base_url: anthropic_base_url.into(),
        }
    }
}

impl Default for ProviderChatModel {
    fn default() -> Self {
        Self::new(reqwest::Client::new(), OPENAI_BASE_URL, ANTHROPIC_BASE_URL)
    }
}

#[async_trait]
impl ChatModelPort for ProviderChatModel {
    async fn stream_chat(&self, request: ChatModelRequest) -> Result<ByteStream, ChatModelError> {
        let provider = provider_for_model(&request.model)
            .ok_or_else(|| ChatModelError::UnsupportedModel(request.model.clone()))?;
        if request.api_key.trim().is_empty() {
            return Err(ChatModelError::MissingApiKey(provider));
        }

        tracing::debug!(
            provider = %provider,
            model = %request.model,
            messages = request.messages.len(),
            tools = request.tools.len(),
            "Starting chat completion"
        );

        let http_request = match provider {
            Provider::Anthropic => anthropic::request(&self.client, &self.anthropic_base_url, &request),
            Provider::OpenAi | Provider::Sitecore => {
                openai::request(&self.client, &self.openai_base_url, &request)
            }
        };
        let response = http_request
            .send()
            .await
            .map_err(|e| ChatModelError::Request(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ChatModelError::Upstream { status, body });
        }

        Ok(response
            .bytes_stream()
            .map(|result| result.map_err(io::Error::other))
            .boxed())
    }
}

/// Join a base URL and a path without doubling the slash.
fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}/{path}", base_url.trim_end_matches('/'))
}
