//! Workspace service: tokens, instances, feature flags and transfer.
//!
//! Every token or instance change re-runs header resolution over the stored
//! MCP servers so their header values follow the credentials they point at.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use super::registry::{McpRegistry, RegistryError, SessionOverrides};
use crate::domain::{ExportBundle, Instance, McpServer, NewInstance, NewToken, Token};
use crate::ports::{JsonStoreExt, KeyValueStore, RepositoryError, StorageKey, encode_entry};

/// Feature flag name -> enabled.
pub type FeatureFlags = BTreeMap<String, bool>;

/// Errors from workspace operations.
#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("Not found: {0}")]
    NotFound(String),

    /// User input failed validation; the message is shown as-is.
    #[error("{0}")]
    Invalid(String),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Service for the settings data shared by the copilot screens.
pub struct WorkspaceService {
    store: Arc<dyn KeyValueStore>,
}

impl WorkspaceService {
    /// Create a new workspace service.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    // =========================================================================
    // Tokens
    // =========================================================================

    pub async fn list_tokens(&self) -> Result<Vec<Token>, WorkspaceError> {
        Ok(self.store.load(StorageKey::Tokens).await?)
    }

    /// Store a token. An active token deactivates its siblings.
    pub async fn add_token(&self, new: NewToken) -> Result<Token, WorkspaceError> {
        if new.name.trim().is_empty() {
            return Err(WorkspaceError::Invalid("Token name is required".to_string()));
        }
        if new.provider.trim().is_empty() {
            return Err(WorkspaceError::Invalid("Please select a provider".to_string()));
        }
        if new.token.trim().is_empty() {
            return Err(WorkspaceError::Invalid("Token value is required".to_string()));
        }

        let token = Token {
            id: Uuid::new_v4().to_string(),
            name: new.name,
            category: new.category,
            provider: new.provider,
            token: new.token,
            active: new.active,
        };
        let _guard = self.store.write_lock().lock().await;
        let mut tokens = self.list_tokens().await?;
        if token.active {
            deactivate_siblings(&mut tokens, &token);
        }
        tokens.push(token.clone());
        self.save_tokens(&tokens).await?;
        tracing::info!(token_id = %token.id, provider = %token.provider, "Added token");
        Ok(token)
    }

    pub async fn delete_token(&self, id: &str) -> Result<(), WorkspaceError> {
        let _guard = self.store.write_lock().lock().await;
        let mut tokens = self.list_tokens().await?;
        let before = tokens.len();
        tokens.retain(|t| t.id != id);
        if tokens.len() == before {
            return Err(WorkspaceError::NotFound(format!("token {id}")));
        }
        self.save_tokens(&tokens).await
    }

    /// Mark a token active, deactivating every other token with the same
    /// category and provider.
    pub async fn activate_token(&self, id: &str) -> Result<Token, WorkspaceError> {
        let _guard = self.store.write_lock().lock().await;
        let mut tokens = self.list_tokens().await?;
        let index = tokens
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| WorkspaceError::NotFound(format!("token {id}")))?;

        let target = tokens[index].clone();
        deactivate_siblings(&mut tokens, &target);
        tokens[index].active = true;
        let activated = tokens[index].clone();
        self.save_tokens(&tokens).await?;
        Ok(activated)
    }

    /// Callers hold the write lock.
    async fn save_tokens(&self, tokens: &[Token]) -> Result<(), WorkspaceError> {
        self.store.save(StorageKey::Tokens, tokens).await?;
        self.reresolve().await
    }

    // =========================================================================
    // Instances
    // =========================================================================

    pub async fn list_instances(&self) -> Result<Vec<Instance>, WorkspaceError> {
        Ok(self.store.load(StorageKey::Instances).await?)
    }

    pub async fn add_instance(&self, new: NewInstance) -> Result<Instance, WorkspaceError> {
        new.validate().map_err(WorkspaceError::Invalid)?;
        let instance = new.into_instance(Uuid::new_v4().to_string());
        let _guard = self.store.write_lock().lock().await;
        let mut instances = self.list_instances().await?;
        instances.push(instance.clone());
        self.save_instances(&instances).await?;
        tracing::info!(instance_id = %instance.id, product = %instance.product, "Added instance");
        Ok(instance)
    }

    pub async fn update_instance(&self, id: &str, update: NewInstance) -> Result<Instance, WorkspaceError> {
        update.validate().map_err(WorkspaceError::Invalid)?;
        let _guard = self.store.write_lock().lock().await;
        let mut instances = self.list_instances().await?;
        let slot = instances
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(|| WorkspaceError::NotFound(format!("instance {id}")))?;
        *slot = update.into_instance(id.to_string());
        let updated = slot.clone();
        self.save_instances(&instances).await?;
        Ok(updated)
    }

    pub async fn delete_instance(&self, id: &str) -> Result<(), WorkspaceError> {
        let _guard = self.store.write_lock().lock().await;
        let mut instances = self.list_instances().await?;
        let before = instances.len();
        instances.retain(|i| i.id != id);
        if instances.len() == before {
            return Err(WorkspaceError::NotFound(format!("instance {id}")));
        }
        self.save_instances(&instances).await
    }

    async fn save_instances(&self, instances: &[Instance]) -> Result<(), WorkspaceError> {
        self.store.save(StorageKey::Instances, instances).await?;
        self.reresolve().await
    }

    async fn reresolve(&self) -> Result<(), WorkspaceError> {
        McpRegistry::new(Arc::clone(&self.store))
            .reresolve_stored()
            .await?;
        Ok(())
    }

    // =========================================================================
    // Transfer
    // =========================================================================

    /// Snapshot tokens, servers and instances.
    pub async fn export(&self) -> Result<ExportBundle, WorkspaceError> {
        Ok(ExportBundle {
            tokens: self.list_tokens().await?,
            servers: self.store.load(StorageKey::McpServers).await?,
            instances: self.list_instances().await?,
            exported_at: Utc::now(),
        })
    }

    /// Replace tokens, servers and instances with an imported document.
    ///
    /// All four keys are written in one batch. Session overrides refer to
    /// server ids and are cleared. Server headers are then re-resolved
    /// against the imported tokens and instances.
    pub async fn import(&self, data: Value) -> Result<ExportBundle, WorkspaceError> {
        let bundle = ExportBundle::from_import(data).map_err(WorkspaceError::Invalid)?;
        let entries = vec![
            encode_entry(StorageKey::Tokens, &bundle.tokens)?,
            encode_entry::<[McpServer]>(StorageKey::McpServers, &bundle.servers)?,
            encode_entry(StorageKey::Instances, &bundle.instances)?,
            encode_entry(StorageKey::SessionOverrides, &SessionOverrides::new())?,
        ];

        let _guard = self.store.write_lock().lock().await;
        self.store.set_many(entries).await?;
        self.reresolve().await?;
        tracing::info!(
            tokens = bundle.tokens.len(),
            servers = bundle.servers.len(),
            instances = bundle.instances.len(),
            "Imported workspace"
        );
        Ok(bundle)
    }

    // =========================================================================
    // Feature flags
    // =========================================================================

    pub async fn feature_flags(&self) -> Result<FeatureFlags, WorkspaceError> {
        Ok(self.store.load(StorageKey::FeatureFlags).await?)
    }

    /// Merge `flags` into the stored map.
    pub async fn set_feature_flags(&self, flags: FeatureFlags) -> Result<FeatureFlags, WorkspaceError> {
        let _guard = self.store.write_lock().lock().await;
        let mut current = self.feature_flags().await?;
        current.extend(flags);
        self.store.save(StorageKey::FeatureFlags, &current).await?;
        Ok(current)
    }
}

fn deactivate_siblings(tokens: &mut [Token], active: &Token) {
    for token in tokens
        .iter_mut()
        .filter(|t| t.id != active.id && t.is_sibling_of(active))
    {
        token.active = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{HeaderConfig, HeaderSource, NewMcpServer};
    use crate::ports::MemoryStore;
    use serde_json::json;

    fn service() -> (WorkspaceService, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (WorkspaceService::new(store.clone()), store)
    }

    fn new_token(name: &str, provider: &str, active: bool) -> NewToken {
        NewToken {
            name: name.into(),
            category: "ai".into(),
            provider: provider.into(),
            token: format!("secret-{name}"),
            active,
        }
    }

    #[tokio::test]
    async fn activation_leaves_one_active_sibling() {
        let (service, _) = service();
        let a = service.add_token(new_token("a", "openai", true)).await.unwrap();
        let b = service.add_token(new_token("b", "openai", true)).await.unwrap();
        let c = service.add_token(new_token("c", "anthropic", true)).await.unwrap();

        let tokens = service.list_tokens().await.unwrap();
        let active: Vec<_> = tokens.iter().filter(|t| t.active).map(|t| t.id.clone()).collect();
        assert_eq!(active, vec![b.id.clone(), c.id.clone()]);

        service.activate_token(&a.id).await.unwrap();
        let tokens = service.list_tokens().await.unwrap();
        let active: Vec<_> = tokens.iter().filter(|t| t.active).map(|t| t.id.clone()).collect();
        assert_eq!(active, vec![a.id, c.id]);
    }

    #[tokio::test]
    async fn token_validation_and_missing_ids() {
        let (service, _) = service();
        let mut blank = new_token("x", "openai", false);
        blank.token = String::new();
        assert!(matches!(service.add_token(blank).await, Err(WorkspaceError::Invalid(_))));
        assert!(matches!(service.delete_token("nope").await, Err(WorkspaceError::NotFound(_))));
        assert!(matches!(service.activate_token("nope").await, Err(WorkspaceError::NotFound(_))));
    }

    #[tokio::test]
    async fn instance_validation_messages() {
        let (service, _) = service();
        let missing_env = NewInstance {
            name: "XM".into(),
            product: "XM Cloud".into(),
            ..NewInstance::default()
        };
        let err = service.add_instance(missing_env).await.unwrap_err();
        assert_eq!(err.to_string(), "Please select an environment");
    }

    #[tokio::test]
    async fn instance_update_and_delete() {
        let (service, _) = service();
        let created = service
            .add_instance(NewInstance {
                name: "XM".into(),
                product: "XM Cloud".into(),
                environment: "dev".into(),
                ..NewInstance::default()
            })
            .await
            .unwrap();
        let updated = service
            .update_instance(
                &created.id,
                NewInstance {
                    name: "XM prod".into(),
                    product: "XM Cloud".into(),
                    environment: "production".into(),
                    is_active: true,
                    ..NewInstance::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.id, created.id);
        assert!(updated.is_active);
        service.delete_instance(&created.id).await.unwrap();
        assert!(service.list_instances().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn token_changes_reresolve_server_headers() {
        let (service, store) = service();
        let registry = McpRegistry::new(store.clone());
        registry
            .add(NewMcpServer::new_http("cdp", "https://cdp").with_header(
                HeaderConfig::manual("x-api-key", "").with_source(HeaderSource::Token {
                    field: None,
                    token_id: None,
                }),
            ))
            .await
            .unwrap();

        service.add_token(new_token("Personalize", "sitecore", true)).await.unwrap();
        let servers = registry.list().await.unwrap();
        assert_eq!(servers[0].headers[0].value, "secret-Personalize");
    }

    #[tokio::test]
    async fn export_then_import_restores_workspace() {
        let (service, store) = service();
        service.add_token(new_token("a", "openai", true)).await.unwrap();
        service
            .add_instance(NewInstance {
                name: "CDP".into(),
                product: "Personalize".into(),
                environment: "production".into(),
                ..NewInstance::default()
            })
            .await
            .unwrap();
        McpRegistry::new(store.clone())
            .add(NewMcpServer::new_http("docs", "https://docs"))
            .await
            .unwrap();

        let bundle = service.export().await.unwrap();
        let exported = serde_json::to_value(&bundle).unwrap();

        let (fresh, fresh_store) = service_with_junk().await;
        fresh.import(exported).await.unwrap();
        assert_eq!(fresh.list_tokens().await.unwrap(), bundle.tokens);
        assert_eq!(fresh.list_instances().await.unwrap(), bundle.instances);
        let servers: Vec<McpServer> = fresh_store.load(StorageKey::McpServers).await.unwrap();
        assert_eq!(servers, bundle.servers);
    }

    async fn service_with_junk() -> (WorkspaceService, Arc<MemoryStore>) {
        let (service, store) = service();
        service.add_token(new_token("old", "anthropic", true)).await.unwrap();
        (service, store)
    }

    #[tokio::test]
    async fn import_rejects_missing_servers() {
        let (service, _) = service();
        let err = service.import(json!({"tokens": []})).await.unwrap_err();
        assert!(matches!(err, WorkspaceError::Invalid(_)));
        assert!(service.list_tokens().await.unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_token_writes_keep_every_token() {
        let (service, _) = service();
        let service = Arc::new(service);

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let service = Arc::clone(&service);
                tokio::spawn(async move {
                    service
                        .add_token(new_token(&format!("t{i}"), "openai", true))
                        .await
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let tokens = service.list_tokens().await.unwrap();
        assert_eq!(tokens.len(), 16);
        assert_eq!(tokens.iter().filter(|t| t.active).count(), 1);
    }

    #[tokio::test]
    async fn import_reresolves_imported_server_headers() {
        let (service, _) = service();
        let data = json!({
            "tokens": [{
                "id": "t1", "name": "Personalize", "category": "sitecore",
                "provider": "sitecore", "token": "imported-secret", "active": true
            }],
            "servers": [{
                "id": "s1", "name": "cdp", "url": "https://cdp", "type": "http",
                "isActive": true,
                "headers": [{
                    "key": "x-api-key", "value": "stale", "required": true,
                    "source": {"type": "token", "tokenId": "t1"}
                }]
            }]
        });
        service.import(data).await.unwrap();

        let servers = service.export().await.unwrap().servers;
        assert_eq!(servers[0].headers[0].value, "imported-secret");
    }

    #[tokio::test]
    async fn feature_flags_merge() {
        let (service, _) = service();
        let mut flags = FeatureFlags::new();
        flags.insert("agentMode".into(), true);
        service.set_feature_flags(flags).await.unwrap();
        let mut more = FeatureFlags::new();
        more.insert("darkMode".into(), false);
        let merged = service.set_feature_flags(more).await.unwrap();
        assert_eq!(merged.len(), 2);
        assert_eq!(merged.get("agentMode"), Some(&true));
    }
}
