//! Key/value storage port.
//!
//! Replaces the browser's local/session storage: every persisted collection
//! lives under one well-known key as a JSON document. Implementations only
//! move strings; typed access goes through [`JsonStoreExt`].

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::{Mutex, RwLock};

use super::RepositoryError;

/// Lock a store hands out so services can serialize their
/// load-modify-save cycles.
pub type WriteLock = Mutex<()>;

/// Well-known storage keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    /// Stored API tokens.
    Tokens,
    /// Configured Sitecore instances.
    Instances,
    /// Registry of MCP servers.
    McpServers,
    /// Session-level enable/disable overrides per server id.
    SessionOverrides,
    /// Feature flag map.
    FeatureFlags,
}

impl StorageKey {
    /// The storage key string, kept identical to the browser keys.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tokens => "tokens",
            Self::Instances => "instances",
            Self::McpServers => "mcpServers",
            Self::SessionOverrides => "mcp-servers",
            Self::FeatureFlags => "featureFlags",
        }
    }
}

/// Raw string storage addressed by key.
///
/// # Design Rules
///
/// - Values are opaque JSON strings; no schema versioning
/// - `set` replaces the whole value for a key
/// - A missing key is `Ok(None)`, never an error
/// - Services hold [`KeyValueStore::write_lock`] from load to save; every
///   service sharing a store shares its lock
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the raw value stored under `key`.
    async fn get(&self, key: &str) -> Result<Option<String>, RepositoryError>;

    /// Replace the value stored under `key`.
    async fn set(&self, key: &str, value: String) -> Result<(), RepositoryError>;

    /// Replace several keys at once. Either every value is stored or none.
    async fn set_many(&self, entries: Vec<(String, String)>) -> Result<(), RepositoryError>;

    /// Delete the value stored under `key` (no-op when absent).
    async fn remove(&self, key: &str) -> Result<(), RepositoryError>;

    /// The store-wide write lock.
    fn write_lock(&self) -> &WriteLock;
}

/// Encode a value into the `(key, raw)` pair [`KeyValueStore::set_many`] takes.
pub fn encode_entry<T>(key: StorageKey, value: &T) -> Result<(String, String), RepositoryError>
where
    T: Serialize + ?Sized,
{
    let raw = serde_json::to_string(value)
        .map_err(|e| RepositoryError::Serialization(format!("{}: {e}", key.as_str())))?;
    Ok((key.as_str().to_string(), raw))
}

/// Typed JSON helpers over any [`KeyValueStore`].
#[async_trait]
pub trait JsonStoreExt {
    /// Load and decode a value, returning `T::default()` when absent.
    async fn load<T>(&self, key: StorageKey) -> Result<T, RepositoryError>
    where
        T: DeserializeOwned + Default + Send;

    /// Encode and store a value.
    async fn save<T>(&self, key: StorageKey, value: &T) -> Result<(), RepositoryError>
    where
        T: Serialize + Sync + ?Sized;
}

#[async_trait]
impl<S: KeyValueStore + ?Sized> JsonStoreExt for S {
    async fn load<T>(&self, key: StorageKey) -> Result<T, RepositoryError>
    where
        T: DeserializeOwned + Default + Send,
    {
        match self.get(key.as_str()).await? {
            Some(raw) if !raw.trim().is_empty() => serde_json::from_str(&raw).map_err(|e| {
                RepositoryError::Serialization(format!("{}: {e}", key.as_str()))
            }),
            _ => Ok(T::default()),
        }
    }

    async fn save<T>(&self, key: StorageKey, value: &T) -> Result<(), RepositoryError>
    where
        T: Serialize + Sync + ?Sized,
    {
        let (key, raw) = encode_entry(key, value)?;
        self.set(&key, raw).await
    }
}

/// In-memory store for tests and ephemeral runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
    writes: WriteLock,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, RepositoryError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<(), RepositoryError> {
        self.entries.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn set_many(&self, entries: Vec<(String, String)>) -> Result<(), RepositoryError> {
        self.entries.write().await.extend(entries);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), RepositoryError> {
        self.entries.write().await.remove(key);
        Ok(())
    }

    fn write_lock(&self) -> &WriteLock {
        &self.writes
    }
}
