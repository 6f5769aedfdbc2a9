//! Core domain types.
//!
//! These types represent the pure domain model, independent of any
//! infrastructure concerns (storage, HTTP, etc.).
//!
//! # Structure
//!
//! - `token` - Stored API credentials (`Token`, `Provider`)
//! - `instance` - Configured Sitecore environments (`Instance`)
//! - `mcp` - MCP server types (`McpServer`, `HeaderConfig`, templates, tools)
//! - `chat` - Chat messages as sent by the browser
//! - `bundle` - Export/import document

pub mod bundle;
pub mod chat;
pub mod instance;
pub mod mcp;
pub mod token;

pub use bundle::ExportBundle;
pub use chat::{ChatMessage, MessagePart, MessageRole};
pub use instance::{FieldDefinition, Instance, InstanceField, NewInstance};
pub use mcp::{
    HeaderConfig, HeaderSource, McpSecurity, McpServer, McpTool, McpToolResult,
    McpTransportType, NewMcpServer, PreconfiguredCatalog, PreconfiguredServer,
};
pub use token::{NewToken, Provider, Token};
