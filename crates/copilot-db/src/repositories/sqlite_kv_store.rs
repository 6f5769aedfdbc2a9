//! `SQLite` implementation of the `KeyValueStore` trait.

use async_trait::async_trait;
use sqlx::{Row, SqlitePool};

use copilot_core::{KeyValueStore, RepositoryError, WriteLock};

const UPSERT: &str = "INSERT OR REPLACE INTO storage_kv (key, value, updated_at) VALUES (?, ?, ?)";

/// `SQLite` implementation of the `KeyValueStore` trait.
///
/// One row per storage key; the value is the raw JSON document. The write
/// lock is per store, so a process should open one store per database.
pub struct SqliteKeyValueStore {
    pool: SqlitePool,
    writes: WriteLock,
}

impl SqliteKeyValueStore {
    /// Create a store over an initialized pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            writes: WriteLock::default(),
        }
    }
}

fn timestamp() -> String {
    chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

fn storage_error(e: &sqlx::Error) -> RepositoryError {
    RepositoryError::Storage(e.to_string())
}

#[async_trait]
impl KeyValueStore for SqliteKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, RepositoryError> {
        let row = sqlx::query("SELECT value FROM storage_kv WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| storage_error(&e))?;
        Ok(row.map(|r| r.get("value")))
    }

    async fn set(&self, key: &str, value: String) -> Result<(), RepositoryError> {
        sqlx::query(UPSERT)
            .bind(key)
            .bind(&value)
            .bind(timestamp())
            .execute(&self.pool)
            .await
            .map_err(|e| storage_error(&e))?;

        tracing::trace!(key, bytes = value.len(), "Stored value");
        Ok(())
    }

    async fn set_many(&self, entries: Vec<(String, String)>) -> Result<(), RepositoryError> {
        let updated_at = timestamp();
        let mut tx = self.pool.begin().await.map_err(|e| storage_error(&e))?;
        for (key, value) in &entries {
            sqlx::query(UPSERT)
                .bind(key)
                .bind(value)
                .bind(&updated_at)
                .execute(&mut *tx)
                .await
                .map_err(|e| storage_error(&e))?;
        }
        tx.commit().await.map_err(|e| storage_error(&e))?;

        tracing::trace!(keys = entries.len(), "Stored values in one transaction");
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM storage_kv WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(|e| storage_error(&e))?;
        Ok(())
    }

    fn write_lock(&self) -> &WriteLock {
        &self.writes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::setup::setup_test_database;
    use copilot_core::{
        JsonStoreExt, McpRegistry, NewMcpServer, NewToken, StorageKey, Token, WorkspaceService,
    };
    use std::sync::Arc;

    async fn store() -> SqliteKeyValueStore {
        SqliteKeyValueStore::new(setup_test_database().await.unwrap())
    }

    #[tokio::test]
    async fn get_missing_key_is_none() {
        let store = store().await;
        assert_eq!(store.get("tokens").await.unwrap(), None);
    }

    #[tokio::test]
    async fn set_replaces_previous_value() {
        let store = store().await;
        store.set("featureFlags", "{\"a\":true}".into()).await.unwrap();
        store.set("featureFlags", "{\"a\":false}".into()).await.unwrap();
        assert_eq!(
            store.get("featureFlags").await.unwrap().as_deref(),
            Some("{\"a\":false}")
        );

        store.remove("featureFlags").await.unwrap();
        assert_eq!(store.get("featureFlags").await.unwrap(), None);
    }

    #[tokio::test]
    async fn typed_helpers_work_over_sqlite() {
        let store = store().await;
        let tokens = vec![Token {
            id: "t1".into(),
            name: "Personalize".into(),
            provider: "sitecore".into(),
            token: "secret".into(),
            active: true,
            ..Token::default()
        }];
        store.save(StorageKey::Tokens, &tokens).await.unwrap();

        let raw = store.get("tokens").await.unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value[0]["provider"], "sitecore");

        let loaded: Vec<Token> = store.load(StorageKey::Tokens).await.unwrap();
        assert_eq!(loaded, tokens);
    }

    #[tokio::test]
    async fn set_many_writes_every_key() {
        let store = store().await;
        store.set("tokens", "[{}]".into()).await.unwrap();
        store
            .set_many(vec![
                ("tokens".into(), "[]".into()),
                ("mcp-servers".into(), "{}".into()),
            ])
            .await
            .unwrap();
        assert_eq!(store.get("tokens").await.unwrap().as_deref(), Some("[]"));
        assert_eq!(store.get("mcp-servers").await.unwrap().as_deref(), Some("{}"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_writers_on_one_file_lose_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let pool = crate::setup_database(&dir.path().join("copilot.db")).await.unwrap();
        let store: Arc<dyn KeyValueStore> = Arc::new(SqliteKeyValueStore::new(pool));
        let registry = Arc::new(McpRegistry::new(Arc::clone(&store)));
        let workspace = Arc::new(WorkspaceService::new(Arc::clone(&store)));

        let mut handles = Vec::new();
        for i in 0..16 {
            let registry = Arc::clone(&registry);
            let workspace = Arc::clone(&workspace);
            handles.push(tokio::spawn(async move {
                registry
                    .add(NewMcpServer::new_http(format!("s{i}"), "https://s"))
                    .await
                    .unwrap();
                workspace
                    .add_token(NewToken {
                        name: format!("t{i}"),
                        category: "ai".into(),
                        provider: "openai".into(),
                        token: "secret".into(),
                        active: true,
                    })
                    .await
                    .unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(registry.list().await.unwrap().len(), 16);
        let tokens = workspace.list_tokens().await.unwrap();
        assert_eq!(tokens.len(), 16);
        assert_eq!(tokens.iter().filter(|t| t.active).count(), 1);
    }

    #[tokio::test]
    async fn values_survive_reopening_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("copilot.db");
        {
            let store = SqliteKeyValueStore::new(crate::setup_database(&path).await.unwrap());
            store.set("instances", "[]".into()).await.unwrap();
        }
        let store = SqliteKeyValueStore::new(crate::setup_database(&path).await.unwrap());
        assert_eq!(store.get("instances").await.unwrap().as_deref(), Some("[]"));
    }
}
