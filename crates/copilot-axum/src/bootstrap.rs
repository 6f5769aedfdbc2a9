//! Axum server bootstrap - the composition root.
//!
//! This module is the only place where storage, the MCP connector and the
//! model clients are wired together for the web adapter.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use copilot_core::paths::{catalog_path, database_path};
use copilot_core::{KeyValueStore, McpConnector, McpRegistry, MemoryStore, WorkspaceService};
use copilot_db::{SqliteKeyValueStore, setup_database};
use copilot_mcp::{HttpMcpConnector, ToolSetBuilder};

use crate::llm::{ANTHROPIC_BASE_URL, ChatModelPort, OPENAI_BASE_URL, ProviderChatModel};

/// Default port for the HTTP server.
pub const DEFAULT_PORT: u16 = 8787;

/// Default cap on a streamed chat response.
pub const DEFAULT_CHAT_MAX_DURATION: Duration = Duration::from_secs(300);

/// CORS configuration for the web server.
#[derive(Debug, Clone, Default)]
pub enum CorsConfig {
    /// Allow all origins (development mode).
    #[default]
    AllowAll,
    /// Allow specific origins (production mode).
    AllowOrigins(Vec<String>),
}

/// Server configuration for the Axum adapter.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port for the HTTP server.
    pub port: u16,
    /// `SQLite` database file. `None` keeps everything in memory.
    pub db_path: Option<PathBuf>,
    /// Preconfigured MCP server catalog (YAML).
    pub catalog_path: PathBuf,
    pub openai_base_url: String,
    pub anthropic_base_url: String,
    /// Maximum lifetime of a streamed chat response.
    pub chat_max_duration: Duration,
    /// CORS configuration.
    pub cors: CorsConfig,
}

impl ServerConfig {
    /// Create config with default paths.
    pub fn with_defaults() -> Result<Self> {
        Ok(Self {
            port: DEFAULT_PORT,
            db_path: Some(database_path()?),
            catalog_path: catalog_path()?,
            openai_base_url: OPENAI_BASE_URL.to_string(),
            anthropic_base_url: ANTHROPIC_BASE_URL.to_string(),
            chat_max_duration: DEFAULT_CHAT_MAX_DURATION,
            cors: CorsConfig::default(),
        })
    }

    /// Set CORS to allow specific origins.
    #[must_use]
    pub fn with_allowed_origins(mut self, origins: Vec<String>) -> Self {
        self.cors = CorsConfig::AllowOrigins(origins);
        self
    }
}

/// Application context for the Axum adapter.
pub struct AxumContext {
    pub registry: McpRegistry,
    pub workspace: WorkspaceService,
    /// Opens the per-request MCP sessions for chat.
    pub tools: ToolSetBuilder,
    pub chat_model: Arc<dyn ChatModelPort>,
    pub catalog_path: PathBuf,
    pub chat_max_duration: Duration,
}

impl AxumContext {
    /// Assemble a context from already-built adapters.
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        connector: Arc<dyn McpConnector>,
        chat_model: Arc<dyn ChatModelPort>,
        catalog_path: PathBuf,
        chat_max_duration: Duration,
    ) -> Self {
        Self {
            registry: McpRegistry::new(Arc::clone(&store)),
            workspace: WorkspaceService::new(store),
            tools: ToolSetBuilder::new(connector),
            chat_model,
            catalog_path,
            chat_max_duration,
        }
    }
}

/// Open the configured store.
pub async fn open_store(db_path: Option<&std::path::Path>) -> Result<Arc<dyn KeyValueStore>> {
    match db_path {
        Some(path) => {
            let pool = setup_database(path).await?;
            Ok(Arc::new(SqliteKeyValueStore::new(pool)))
        }
        None => {
            tracing::warn!("No database path configured; settings will not persist");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

/// Bootstrap the Axum server with all services.
pub async fn bootstrap(config: ServerConfig) -> Result<AxumContext> {
    tracing::info!(
        database_path = ?config.db_path,
        catalog_path = %config.catalog_path.display(),
        chat_max_duration_secs = config.chat_max_duration.as_secs(),
        "Axum bootstrap resolved paths"
    );

    let store = open_store(config.db_path.as_deref()).await?;

    let http = reqwest::Client::new();
    let connector: Arc<dyn McpConnector> = Arc::new(HttpMcpConnector::new(http.clone()));
    let chat_model: Arc<dyn ChatModelPort> = Arc::new(ProviderChatModel::new(
        http,
        config.openai_base_url,
        config.anthropic_base_url,
    ));

    Ok(AxumContext::new(
        store,
        connector,
        chat_model,
        config.catalog_path,
        config.chat_max_duration,
    ))
}

/// Start the web server on the configured port.
pub async fn start_server(config: ServerConfig) -> Result<()> {
    use tokio::net::TcpListener;

    let cors = config.cors.clone();
    let port = config.port;
    let ctx = bootstrap(config).await?;
    let app = crate::routes::create_router(ctx, &cors);

    let addr = format!("0.0.0.0:{port}");
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Copilot API listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
