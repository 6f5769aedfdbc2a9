//! MCP server domain types.
//!
//! These types are shared between the Rust backend and the browser frontend,
//! so they serialize with camelCase keys.

use serde::{Deserialize, Serialize};

/// Transport used to reach an MCP server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum McpTransportType {
    /// Streamable HTTP: JSON-RPC POSTs, responses as JSON or an event stream.
    #[default]
    Http,
    /// Legacy SSE: a long-lived event stream plus a POST endpoint.
    Sse,
}

/// Authentication style advertised by a server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum McpSecurity {
    #[default]
    Open,
    Oauth,
}

/// Where a header's value comes from.
///
/// `tokenId`/`instanceId` are explicit references; when absent the resolver
/// falls back to matching by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum HeaderSource {
    /// Typed in by the user; never rewritten.
    Manual,
    /// Copied from a stored API token.
    Token {
        /// Token attribute to copy (defaults to the secret).
        #[serde(default, skip_serializing_if = "Option::is_none")]
        field: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        token_id: Option<String>,
    },
    /// Copied from a field of a configured instance (dot paths allowed).
    Instance {
        #[serde(default)]
        field: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        instance_id: Option<String>,
    },
    /// Filled at request time from the active instance sharing the server's
    /// API definition.
    ApiDefinition {
        #[serde(default, alias = "field")]
        field_id: String,
    },
}

/// A header declaration embedded in an MCP server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderConfig {
    pub key: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<HeaderSource>,
}

impl HeaderConfig {
    /// A manually entered header.
    pub fn manual(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            required: false,
            source: None,
        }
    }

    /// Attach a value source.
    #[must_use]
    pub fn with_source(mut self, source: HeaderSource) -> Self {
        self.source = Some(source);
        self
    }

    /// Mark the header as required.
    #[must_use]
    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Required but still empty; shown as a warning in the UI.
    pub fn is_missing(&self) -> bool {
        self.required && self.value.trim().is_empty()
    }
}

/// An MCP server known to the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct McpServer {
    pub id: String,
    pub name: String,
    pub url: String,
    #[serde(rename = "type", default)]
    pub transport: McpTransportType,
    #[serde(default)]
    pub security: McpSecurity,
    #[serde(default)]
    pub is_active: bool,
    /// Servers with an API definition need a matching active instance.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_definition_id: Option<String>,
    /// Template name when created from the preconfigured catalog.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preset: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub headers: Vec<HeaderConfig>,
}

impl McpServer {
    /// Whether this server can only run with a matching instance.
    pub const fn requires_instance(&self) -> bool {
        self.api_definition_id.is_some()
    }

    /// Prefix applied to this server's tool names in a merged tool set.
    pub fn tool_prefix(&self) -> String {
        format!("{}_", self.name)
    }
}

/// An MCP server to be added (no ID yet).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMcpServer {
    pub name: String,
    pub url: String,
    #[serde(rename = "type", default)]
    pub transport: McpTransportType,
    #[serde(default)]
    pub security: McpSecurity,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub api_definition_id: Option<String>,
    #[serde(default)]
    pub preset: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub headers: Vec<HeaderConfig>,
}

const fn default_true() -> bool {
    true
}

impl NewMcpServer {
    /// Create a new streamable-HTTP server.
    pub fn new_http(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            transport: McpTransportType::Http,
            security: McpSecurity::Open,
            is_active: true,
            api_definition_id: None,
            preset: None,
            description: None,
            headers: Vec::new(),
        }
    }

    /// Create a new SSE server.
    pub fn new_sse(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            transport: McpTransportType::Sse,
            ..Self::new_http(name, url)
        }
    }

    /// Add a header declaration.
    #[must_use]
    pub fn with_header(mut self, header: HeaderConfig) -> Self {
        self.headers.push(header);
        self
    }

    /// Require an instance with this API definition.
    #[must_use]
    pub fn with_api_definition(mut self, id: impl Into<String>) -> Self {
        self.api_definition_id = Some(id.into());
        self
    }

    /// Validate the fields a user must fill in.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Server name is required".to_string());
        }
        if self.name.contains(char::is_whitespace) {
            return Err("Server name must not contain whitespace (it prefixes tool names)".to_string());
        }
        let url = self.url.trim();
        if url.is_empty() {
            return Err("Server url is required".to_string());
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(format!("Server url must be http(s): {url}"));
        }
        if self.headers.iter().any(|h| h.key.trim().is_empty()) {
            return Err("Header keys cannot be empty".to_string());
        }
        Ok(())
    }

    /// Attach an id, producing a registry entry.
    pub fn into_server(self, id: String) -> McpServer {
        McpServer {
            id,
            name: self.name,
            url: self.url,
            transport: self.transport,
            security: self.security,
            is_active: self.is_active,
            api_definition_id: self.api_definition_id,
            preset: self.preset,
            description: self.description,
            headers: self.headers,
        }
    }
}

/// Tool definition from an MCP server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct McpTool {
    /// Tool name (function name).
    pub name: String,

    /// Human-readable description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// JSON Schema for input parameters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_schema: Option<serde_json::Value>,
}

impl McpTool {
    /// Create a new tool definition.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            input_schema: None,
        }
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    /// Set the input schema.
    #[must_use]
    pub fn with_input_schema(mut self, schema: serde_json::Value) -> Self {
        self.input_schema = Some(schema);
        self
    }

    /// Schema to hand to a model, defaulting to an empty object schema.
    pub fn parameters(&self) -> serde_json::Value {
        self.input_schema
            .clone()
            .unwrap_or_else(|| serde_json::json!({"type": "object", "properties": {}}))
    }
}

/// Result of a tool call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpToolResult {
    /// Whether the call succeeded.
    pub success: bool,

    /// Result data (if success).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,

    /// Error message (if failed).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl McpToolResult {
    /// Create a success result.
    #[must_use]
    pub const fn success(data: serde_json::Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// Create an error result.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn header_source_is_tagged_by_type() {
        let header: HeaderConfig = serde_json::from_value(json!({
            "key": "x-client-key",
            "value": "",
            "required": true,
            "source": {"type": "apiDefinition", "fieldId": "clientKey"}
        }))
        .unwrap();
        assert_eq!(
            header.source,
            Some(HeaderSource::ApiDefinition {
                field_id: "clientKey".into()
            })
        );
        assert!(header.is_missing());
    }

    #[test]
    fn token_source_round_trips_explicit_reference() {
        let source = HeaderSource::Token {
            field: None,
            token_id: Some("tok-1".into()),
        };
        let json = serde_json::to_value(&source).unwrap();
        assert_eq!(json, json!({"type": "token", "tokenId": "tok-1"}));
    }

    #[test]
    fn server_type_field_is_named_type() {
        let server = NewMcpServer::new_sse("docs", "https://example.com/sse").into_server("s1".into());
        let json = serde_json::to_value(&server).unwrap();
        assert_eq!(json["type"], "sse");
        assert_eq!(json["isActive"], true);
        assert_eq!(server.tool_prefix(), "docs_");
    }

    #[test]
    fn new_server_validation() {
        assert!(NewMcpServer::new_http("xm", "https://mcp.example.com").validate().is_ok());
        assert!(NewMcpServer::new_http("", "https://mcp.example.com").validate().is_err());
        assert!(NewMcpServer::new_http("my server", "https://x").validate().is_err());
        assert!(NewMcpServer::new_http("xm", "ftp://x").validate().is_err());
        let blank_header = NewMcpServer::new_http("xm", "https://x").with_header(HeaderConfig::manual(" ", "v"));
        assert!(blank_header.validate().is_err());
    }

    #[test]
    fn tool_parameters_default_to_empty_object() {
        let tool = McpTool::new("search");
        assert_eq!(tool.parameters()["type"], "object");
    }
}
