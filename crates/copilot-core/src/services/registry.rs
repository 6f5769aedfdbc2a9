//! MCP server registry.
//!
//! Persisted servers live under `mcpServers`; per-session enable/disable
//! overrides under `mcp-servers`. The registry merges both with the
//! preconfigured catalog into the list the settings screen shows, and
//! computes the servers a chat request may use.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use super::header_resolver;
use crate::domain::{
    HeaderConfig, Instance, McpServer, McpTransportType, NewMcpServer, PreconfiguredCatalog, Token,
};
use crate::ports::{JsonStoreExt, KeyValueStore, RepositoryError, StorageKey};

/// Server id -> session-level enabled flag.
pub type SessionOverrides = BTreeMap<String, bool>;

/// Errors from registry operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("MCP server not found: {0}")]
    NotFound(String),

    #[error("Unknown preconfigured server: {0}")]
    UnknownPreset(String),

    #[error("An MCP server named '{0}' already exists")]
    Conflict(String),

    #[error("Invalid MCP server: {0}")]
    Invalid(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// `true` when the server declares no API definition, or an active instance
/// with the same API definition exists.
pub fn available(server: &McpServer, instances: &[Instance]) -> bool {
    api_definition_available(server.api_definition_id.as_deref(), instances)
}

/// Availability rule shared by stored servers and catalog presets.
fn api_definition_available(api_definition_id: Option<&str>, instances: &[Instance]) -> bool {
    api_definition_id.is_none_or(|def| instances.iter().any(|i| i.serves_api_definition(def)))
}

/// Whether a server takes part in chat requests this session.
pub fn is_enabled(server: &McpServer, overrides: &SessionOverrides, instances: &[Instance]) -> bool {
    server.is_active
        && available(server, instances)
        && overrides.get(&server.id).copied().unwrap_or(true)
}

/// One row of the settings screen: a stored server or a not-yet-added preset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryEntry {
    /// `None` for presets that have not been added.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub url: String,
    #[serde(rename = "type")]
    pub transport: McpTransportType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preset: Option<String>,
    pub added: bool,
    pub is_active: bool,
    pub requires_instance: bool,
    pub available: bool,
    pub enabled: bool,
    pub missing_headers: Vec<String>,
}

/// Registry service over the key/value store.
pub struct McpRegistry {
    store: Arc<dyn KeyValueStore>,
}

impl McpRegistry {
    /// Create a registry backed by `store`.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// All persisted servers, in insertion order.
    pub async fn list(&self) -> Result<Vec<McpServer>, RegistryError> {
        Ok(self.store.load(StorageKey::McpServers).await?)
    }

    /// Get one server by id.
    pub async fn get(&self, id: &str) -> Result<McpServer, RegistryError> {
        self.list()
            .await?
            .into_iter()
            .find(|s| s.id == id)
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))
    }

    /// Persisted servers followed by the presets not yet added.
    pub async fn view(&self, catalog: &PreconfiguredCatalog) -> Result<Vec<RegistryEntry>, RegistryError> {
        let servers = self.list().await?;
        let overrides = self.overrides().await?;
        let instances: Vec<Instance> = self.store.load(StorageKey::Instances).await?;

        let added: HashSet<&str> = servers
            .iter()
            .flat_map(|s| [Some(s.name.as_str()), s.preset.as_deref()])
            .flatten()
            .collect();

        let mut entries: Vec<RegistryEntry> = servers
            .iter()
            .map(|server| RegistryEntry {
                id: Some(server.id.clone()),
                name: server.name.clone(),
                url: server.url.clone(),
                transport: server.transport,
                description: server.description.clone(),
                preset: server.preset.clone(),
                added: true,
                is_active: server.is_active,
                requires_instance: server.requires_instance(),
                available: available(server, &instances),
                enabled: is_enabled(server, &overrides, &instances),
                missing_headers: header_resolver::missing_required(&server.headers),
            })
            .collect();

        entries.extend(
            catalog
                .servers
                .iter()
                .filter(|preset| !added.contains(preset.name.as_str()))
                .map(|preset| RegistryEntry {
                    id: None,
                    name: preset.name.clone(),
                    url: preset.url.clone(),
                    transport: preset.transport,
                    description: preset.description.clone(),
                    preset: Some(preset.name.clone()),
                    added: false,
                    is_active: false,
                    requires_instance: preset.api_definition_id.is_some(),
                    available: api_definition_available(preset.api_definition_id.as_deref(), &instances),
                    enabled: false,
                    missing_headers: Vec::new(),
                }),
        );

        Ok(entries)
    }

    /// Add a server under a fresh id, resolving its headers against the
    /// stored tokens and instances.
    pub async fn add(&self, new: NewMcpServer) -> Result<McpServer, RegistryError> {
        new.validate().map_err(RegistryError::Invalid)?;
        let _guard = self.store.write_lock().lock().await;
        let mut servers = self.list().await?;
        if servers.iter().any(|s| s.name == new.name) {
            return Err(RegistryError::Conflict(new.name));
        }

        let (tokens, instances) = self.header_inputs().await?;
        let mut server = new.into_server(Uuid::new_v4().to_string());
        server.headers = header_resolver::resolve(&server.headers, &tokens, &instances);

        servers.push(server.clone());
        self.store.save(StorageKey::McpServers, &servers).await?;
        tracing::info!(server_id = %server.id, name = %server.name, "Added MCP server");
        Ok(server)
    }

    /// Copy a preconfigured template into a new server.
    pub async fn add_preset(
        &self,
        catalog: &PreconfiguredCatalog,
        name: &str,
    ) -> Result<McpServer, RegistryError> {
        let template = catalog
            .get(name)
            .ok_or_else(|| RegistryError::UnknownPreset(name.to_string()))?;
        self.add(template.instantiate()).await
    }

    /// Remove a server and its session override.
    pub async fn delete(&self, id: &str) -> Result<(), RegistryError> {
        let _guard = self.store.write_lock().lock().await;
        let mut servers = self.list().await?;
        let before = servers.len();
        servers.retain(|s| s.id != id);
        if servers.len() == before {
            return Err(RegistryError::NotFound(id.to_string()));
        }
        self.store.save(StorageKey::McpServers, &servers).await?;

        let mut overrides = self.overrides().await?;
        if overrides.remove(id).is_some() {
            self.store.save(StorageKey::SessionOverrides, &overrides).await?;
        }
        tracing::info!(server_id = %id, "Deleted MCP server");
        Ok(())
    }

    /// Flip `isActive`.
    pub async fn toggle_active(&self, id: &str) -> Result<McpServer, RegistryError> {
        self.modify(id, |server| server.is_active = !server.is_active)
            .await
    }

    /// Replace the header list wholesale.
    pub async fn update_headers(
        &self,
        id: &str,
        headers: Vec<HeaderConfig>,
    ) -> Result<McpServer, RegistryError> {
        if headers.iter().any(|h| h.key.trim().is_empty()) {
            return Err(RegistryError::Invalid("Header keys cannot be empty".to_string()));
        }
        self.modify(id, move |server| server.headers = headers).await
    }

    /// Re-run header resolution over every stored server.
    ///
    /// Returns how many servers changed.
    pub async fn reresolve_headers(&self) -> Result<usize, RegistryError> {
        let _guard = self.store.write_lock().lock().await;
        self.reresolve_stored().await
    }

    /// [`Self::reresolve_headers`] for callers already holding the write lock.
    pub(crate) async fn reresolve_stored(&self) -> Result<usize, RegistryError> {
        let (tokens, instances) = self.header_inputs().await?;
        let mut servers = self.list().await?;
        let mut changed = 0;
        for server in &mut servers {
            let resolved = header_resolver::resolve(&server.headers, &tokens, &instances);
            if resolved != server.headers {
                server.headers = resolved;
                changed += 1;
            }
        }
        if changed > 0 {
            self.store.save(StorageKey::McpServers, &servers).await?;
            tracing::debug!(changed, "Re-resolved MCP server headers");
        }
        Ok(changed)
    }

    /// Session-level overrides.
    pub async fn overrides(&self) -> Result<SessionOverrides, RegistryError> {
        Ok(self.store.load(StorageKey::SessionOverrides).await?)
    }

    /// Set the session-level enabled flag of a server.
    pub async fn set_enabled(&self, id: &str, enabled: bool) -> Result<(), RegistryError> {
        let _guard = self.store.write_lock().lock().await;
        self.get(id).await?;
        let mut overrides = self.overrides().await?;
        overrides.insert(id.to_string(), enabled);
        self.store.save(StorageKey::SessionOverrides, &overrides).await?;
        Ok(())
    }

    /// Servers a chat request should use right now.
    pub async fn enabled_servers(&self) -> Result<Vec<McpServer>, RegistryError> {
        let overrides = self.overrides().await?;
        let instances: Vec<Instance> = self.store.load(StorageKey::Instances).await?;
        Ok(self
            .list()
            .await?
            .into_iter()
            .filter(|s| is_enabled(s, &overrides, &instances))
            .collect())
    }

    async fn modify<F>(&self, id: &str, f: F) -> Result<McpServer, RegistryError>
    where
        F: FnOnce(&mut McpServer),
    {
        let _guard = self.store.write_lock().lock().await;
        let mut servers = self.list().await?;
        let server = servers
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))?;
        f(server);
        let updated = server.clone();
        self.store.save(StorageKey::McpServers, &servers).await?;
        Ok(updated)
    }

    async fn header_inputs(&self) -> Result<(Vec<Token>, Vec<Instance>), RegistryError> {
        let tokens = self.store.load(StorageKey::Tokens).await?;
        let instances = self.store.load(StorageKey::Instances).await?;
        Ok((tokens, instances))
    }
}
