#![doc = include_str!("../README.md")]
#![deny(unused_crate_dependencies)]

pub mod config;
pub mod domain;
pub mod paths;
pub mod ports;
pub mod services;

// Re-export commonly used types for convenience
pub use config::{CatalogError, load_catalog, read_catalog};
pub use domain::{
    ChatMessage, ExportBundle, HeaderConfig, HeaderSource, Instance, McpSecurity, McpServer,
    McpTool, McpToolResult, McpTransportType, MessageRole, NewInstance, NewMcpServer, NewToken,
    PreconfiguredCatalog, PreconfiguredServer, Provider, Token,
};
pub use paths::{PathError, catalog_path, data_root, database_path};
pub use ports::{
    JsonStoreExt, KeyValueStore, McpClientError, McpConnectTarget, McpConnector, McpSession,
    MemoryStore, RepositoryError, StorageKey, WriteLock, encode_entry,
};
pub use services::{
    FeatureFlags, McpRegistry, Product, RegistryEntry, RegistryError, RouteDecision,
    SessionOverrides, WorkspaceError, WorkspaceService,
};
