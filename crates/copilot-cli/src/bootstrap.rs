//! CLI composition root.
//!
//! Resolves the data locations and opens the storage the non-server
//! commands work against.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use copilot_core::paths::{catalog_path, database_path};
use copilot_core::{KeyValueStore, McpRegistry, WorkspaceService};
use copilot_db::{SqliteKeyValueStore, setup_database};

use crate::parser::Cli;

/// Resolved data locations.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub db_path: PathBuf,
    pub catalog_path: PathBuf,
}

impl CliConfig {
    /// Default locations under the data directory.
    pub fn with_defaults() -> Result<Self> {
        Ok(Self {
            db_path: database_path()?,
            catalog_path: catalog_path()?,
        })
    }

    /// Defaults overridden by the global flags.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let defaults = Self::with_defaults()?;
        Ok(Self {
            db_path: cli.db_path.clone().unwrap_or(defaults.db_path),
            catalog_path: cli.mcp_config.clone().unwrap_or(defaults.catalog_path),
        })
    }
}

/// Services available to command handlers.
pub struct CliContext {
    pub registry: McpRegistry,
    pub workspace: WorkspaceService,
    pub catalog_path: PathBuf,
}

/// Open the database and build the services.
pub async fn bootstrap(config: &CliConfig) -> Result<CliContext> {
    let pool = setup_database(&config.db_path).await?;
    let store: Arc<dyn KeyValueStore> = Arc::new(SqliteKeyValueStore::new(pool));
    tracing::debug!(db_path = %config.db_path.display(), "Opened settings store");

    Ok(CliContext {
        registry: McpRegistry::new(Arc::clone(&store)),
        workspace: WorkspaceService::new(store),
        catalog_path: config.catalog_path.clone(),
    })
}
