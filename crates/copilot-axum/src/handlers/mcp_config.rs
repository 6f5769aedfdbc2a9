//! Preconfigured MCP server catalog.

use axum::Json;
use axum::extract::State;
use copilot_core::{PreconfiguredCatalog, load_catalog};

use crate::state::AppState;

/// GET /api/mcp-servers-config
///
/// A missing or unreadable catalog answers with an empty server list.
pub async fn get(State(state): State<AppState>) -> Json<PreconfiguredCatalog> {
    Json(load_catalog(&state.catalog_path).await)
}
