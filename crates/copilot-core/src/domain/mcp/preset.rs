//! Preconfigured MCP server templates.
//!
//! Templates are read-only data shipped in a YAML file. Selecting one copies
//! it into a new [`NewMcpServer`]; the template itself is never mutated.

use serde::{Deserialize, Serialize};

use super::types::{HeaderConfig, McpSecurity, McpTransportType, NewMcpServer};

/// One preconfigured server entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreconfiguredServer {
    /// Display label.
    #[serde(default)]
    pub label: String,
    /// Stable template name; also used as the server name.
    pub name: String,
    pub url: String,
    #[serde(rename = "type", default)]
    pub transport: McpTransportType,
    #[serde(default)]
    pub security: McpSecurity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_definition_id: Option<String>,
    #[serde(default)]
    pub headers: Vec<HeaderConfig>,
}

impl PreconfiguredServer {
    /// Copy the template into a server ready to be added.
    pub fn instantiate(&self) -> NewMcpServer {
        NewMcpServer {
            name: self.name.clone(),
            url: self.url.clone(),
            transport: self.transport,
            security: self.security,
            is_active: true,
            api_definition_id: self.api_definition_id.clone(),
            preset: Some(self.name.clone()),
            description: self.description.clone().or_else(|| {
                if self.label.is_empty() {
                    None
                } else {
                    Some(self.label.clone())
                }
            }),
            headers: self.headers.clone(),
        }
    }
}

/// The whole preconfigured catalog (`{servers: [...]}`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreconfiguredCatalog {
    #[serde(default)]
    pub servers: Vec<PreconfiguredServer>,
}

impl PreconfiguredCatalog {
    /// Find a template by name.
    pub fn get(&self, name: &str) -> Option<&PreconfiguredServer> {
        self.servers.iter().find(|s| s.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::mcp::HeaderSource;

    #[test]
    fn instantiate_copies_template_and_marks_preset() {
        let template = PreconfiguredServer {
            label: "Sitecore Personalize".into(),
            name: "personalize".into(),
            url: "https://mcp.example.com/personalize".into(),
            transport: McpTransportType::Sse,
            security: McpSecurity::Open,
            category: Some("sitecore".into()),
            description: None,
            api_definition_id: Some("cdp".into()),
            headers: vec![HeaderConfig::manual("x-client-key", "").required().with_source(
                HeaderSource::ApiDefinition {
                    field_id: "clientKey".into(),
                },
            )],
        };

        let server = template.instantiate();
        assert_eq!(server.preset.as_deref(), Some("personalize"));
        assert_eq!(server.description.as_deref(), Some("Sitecore Personalize"));
        assert_eq!(server.transport, McpTransportType::Sse);
        assert_eq!(server.headers, template.headers);
        assert!(server.is_active);
    }
}
