//! Workspace export bundle.
//!
//! A bundle is the JSON document written by "export" and read back by
//! "import": every token, server and instance plus a timestamp. Import is a
//! full replace; nothing is merged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::instance::Instance;
use super::mcp::McpServer;
use super::token::Token;

/// Exported workspace contents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportBundle {
    pub tokens: Vec<Token>,
    pub servers: Vec<McpServer>,
    #[serde(default)]
    pub instances: Vec<Instance>,
    pub exported_at: DateTime<Utc>,
}

impl ExportBundle {
    /// Parse an import document, checking its structure first.
    ///
    /// `tokens` and `servers` must both be arrays; `instances` may be
    /// absent but must be an array when present.
    pub fn from_import(data: Value) -> Result<Self, String> {
        let Some(obj) = data.as_object() else {
            return Err("Invalid file structure: expected a JSON object".to_string());
        };

        let is_array = |key: &str| obj.get(key).is_some_and(Value::is_array);
        if !is_array("tokens") || !is_array("servers") {
            return Err(
                "Invalid file structure: 'tokens' and 'servers' must both be arrays".to_string(),
            );
        }
        if obj.get("instances").is_some_and(|v| !v.is_array()) {
            return Err("Invalid file structure: 'instances' must be an array".to_string());
        }

        let tokens: Vec<Token> = parse_array(obj, "tokens")?;
        let servers: Vec<McpServer> = parse_array(obj, "servers")?;
        let instances: Vec<Instance> = if obj.contains_key("instances") {
            parse_array(obj, "instances")?
        } else {
            Vec::new()
        };
        let exported_at = obj
            .get("exportedAt")
            .and_then(Value::as_str)
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map_or_else(Utc::now, |d| d.with_timezone(&Utc));

        Ok(Self {
            tokens,
            servers,
            instances,
            exported_at,
        })
    }
}

fn parse_array<T: serde::de::DeserializeOwned>(
    obj: &serde_json::Map<String, Value>,
    key: &str,
) -> Result<Vec<T>, String> {
    let value = obj.get(key).cloned().unwrap_or(Value::Array(Vec::new()));
    serde_json::from_value(value).map_err(|e| format!("Invalid '{key}' entry: {e}"))
}
