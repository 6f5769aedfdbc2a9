//! Filesystem locations for the database and the preconfigured catalog.

use std::env;
use std::fs;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during path resolution.
#[derive(Debug, Error)]
pub enum PathError {
    /// Could not determine the system data directory.
    #[error("Cannot determine system data directory")]
    NoDataDir,

    /// Failed to create a directory.
    #[error("Failed to create directory {path}: {reason}")]
    CreateFailed { path: PathBuf, reason: String },
}

/// File name of the preconfigured MCP server catalog.
pub const CATALOG_FILE_NAME: &str = "mcp-servers.yaml";

/// Root directory for application data.
///
/// Resolution order:
/// 1. `COPILOT_DATA_DIR` environment variable
/// 2. System data directory (e.g., `~/.local/share/sitecore-copilot`)
pub fn data_root() -> Result<PathBuf, PathError> {
    if let Ok(path) = env::var("COPILOT_DATA_DIR") {
        return Ok(PathBuf::from(path));
    }

    let root = dirs::data_local_dir()
        .ok_or(PathError::NoDataDir)?
        .join("sitecore-copilot");

    if !root.exists() {
        fs::create_dir_all(&root).map_err(|e| PathError::CreateFailed {
            path: root.clone(),
            reason: e.to_string(),
        })?;
    }
    Ok(root)
}

/// Default `SQLite` database path (`<data root>/copilot.db`).
pub fn database_path() -> Result<PathBuf, PathError> {
    Ok(data_root()?.join("copilot.db"))
}

/// Default catalog path: `config/mcp-servers.yaml` under the working
/// directory when present, else under the data root.
pub fn catalog_path() -> Result<PathBuf, PathError> {
    let local = PathBuf::from("config").join(CATALOG_FILE_NAME);
    if local.exists() {
        return Ok(local);
    }
    Ok(data_root()?.join(CATALOG_FILE_NAME))
}
