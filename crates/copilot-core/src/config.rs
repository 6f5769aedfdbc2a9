//! Preconfigured MCP server catalog loading.
//!
//! The catalog is a YAML document (`servers: [...]`) read on every request
//! that needs it. [`load_catalog`] never fails: a missing or malformed file
//! degrades to an empty catalog and a warning.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::domain::PreconfiguredCatalog;

/// Errors reading the catalog file.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Parse catalog YAML text. An empty document is an empty catalog.
pub fn parse_catalog(text: &str) -> Result<PreconfiguredCatalog, serde_yaml::Error> {
    if text.trim().is_empty() {
        return Ok(PreconfiguredCatalog::default());
    }
    serde_yaml::from_str(text)
}

/// Read and parse the catalog, reporting failures.
pub async fn read_catalog(path: &Path) -> Result<PreconfiguredCatalog, CatalogError> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CatalogError::Read {
            path: path.to_path_buf(),
            source,
        })?;
    parse_catalog(&text).map_err(|source| CatalogError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Read the catalog, falling back to an empty one on any failure.
pub async fn load_catalog(path: &Path) -> PreconfiguredCatalog {
    match read_catalog(path).await {
        Ok(catalog) => {
            tracing::debug!(path = %path.display(), servers = catalog.servers.len(), "Loaded MCP catalog");
            catalog
        }
        Err(e) => {
            tracing::warn!(error = %e, "Using empty MCP server catalog");
            PreconfiguredCatalog::default()
        }
    }
}
