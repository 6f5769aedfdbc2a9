//! Port definitions (trait abstractions) for external systems.
//!
//! Ports define the interfaces that the core domain expects from infrastructure.
//! They contain no implementation details and use only domain types.
//!
//! # Design Rules
//!
//! - No `sqlx` or `reqwest` types in any signature
//! - Storage is a plain key/value port; typed access lives in [`JsonStoreExt`]
//! - MCP sessions are owned values closed explicitly by the caller

pub mod mcp;
pub mod storage;

use thiserror::Error;

pub use mcp::{McpClientError, McpConnectTarget, McpConnector, McpSession};
pub use storage::{JsonStoreExt, KeyValueStore, MemoryStore, StorageKey, WriteLock, encode_entry};

/// Domain-specific errors for repository operations.
///
/// This error type abstracts away storage implementation details (e.g., sqlx errors)
/// and provides a clean interface for services to handle storage failures.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The requested entity was not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Storage backend error (database, filesystem, etc.).
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),
}
