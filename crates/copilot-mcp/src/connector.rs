//! Production [`McpConnector`] over HTTP.

use async_trait::async_trait;
use copilot_core::{McpClientError, McpConnectTarget, McpConnector, McpSession, McpTransportType};

use crate::client::McpClient;
use crate::transport::{LegacySseTransport, StreamableHttpTransport, Transport, header_map};

/// Connects to servers with a shared `reqwest` client.
#[derive(Clone, Default)]
pub struct HttpMcpConnector {
    client: reqwest::Client,
}

impl HttpMcpConnector {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl McpConnector for HttpMcpConnector {
    async fn connect(
        &self,
        target: &McpConnectTarget,
    ) -> Result<Box<dyn McpSession>, McpClientError> {
        let headers = header_map(&target.server_name, &target.headers);
        let transport: Box<dyn Transport> = match target.transport {
            McpTransportType::Http => Box::new(StreamableHttpTransport::new(
                target.server_name.clone(),
                self.client.clone(),
                target.url.clone(),
                headers,
            )),
            McpTransportType::Sse => Box::new(
                LegacySseTransport::connect(
                    target.server_name.clone(),
                    self.client.clone(),
                    &target.url,
                    headers,
                )
                .await?,
            ),
        };

        let client = McpClient::initialize(target.server_name.clone(), transport).await?;
        Ok(Box::new(client))
    }
}
