//! HTTP request handlers for the Axum web server.
//!
//! Each submodule contains handlers for a specific API area.
//! Handlers are thin wrappers that delegate to the core services.

pub mod chat;
pub mod feature_flags;
pub mod instances;
pub mod mcp_config;
pub mod mcp_servers;
pub mod tokens;
pub mod transfer;
