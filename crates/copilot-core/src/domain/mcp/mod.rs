//! MCP (Model Context Protocol) server domain types.
//!
//! These types represent MCP servers in the system, independent of any
//! infrastructure concerns (storage, HTTP transports, etc.).
//!
//! # Design
//!
//! - `McpServer` - A registry entry with ID
//! - `NewMcpServer` - A server to be added (no ID yet)
//! - `HeaderConfig` / `HeaderSource` - Header declarations and where their values come from
//! - `PreconfiguredServer` - Read-only template from the YAML catalog
//! - `McpTool` - Tool exposed by an MCP server
//! - `McpToolResult` - Result of a tool invocation

mod preset;
mod types;

pub use preset::{PreconfiguredCatalog, PreconfiguredServer};
pub use types::{
    HeaderConfig, HeaderSource, McpSecurity, McpServer, McpTool, McpToolResult,
    McpTransportType, NewMcpServer,
};
