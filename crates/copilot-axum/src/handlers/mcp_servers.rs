//! MCP registry handlers.

use axum::Json;
use axum::extract::{Path, State};
use copilot_core::{HeaderConfig, McpServer, NewMcpServer, RegistryEntry, load_catalog};
use serde::Deserialize;

use crate::error::HttpError;
use crate::state::AppState;

/// List stored servers merged with the not-yet-added presets.
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<RegistryEntry>>, HttpError> {
    let catalog = load_catalog(&state.catalog_path).await;
    Ok(Json(state.registry.view(&catalog).await?))
}

/// Add a custom server.
pub async fn add(
    State(state): State<AppState>,
    Json(req): Json<NewMcpServer>,
) -> Result<Json<McpServer>, HttpError> {
    Ok(Json(state.registry.add(req).await?))
}

/// Add a server from a preconfigured template.
pub async fn add_preset(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<McpServer>, HttpError> {
    let catalog = load_catalog(&state.catalog_path).await;
    Ok(Json(state.registry.add_preset(&catalog, &name).await?))
}

/// Remove a server.
pub async fn remove(State(state): State<AppState>, Path(id): Path<String>) -> Result<(), HttpError> {
    state.registry.delete(&id).await?;
    Ok(())
}

/// Flip `isActive`.
pub async fn toggle(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<McpServer>, HttpError> {
    Ok(Json(state.registry.toggle_active(&id).await?))
}

#[derive(Debug, Deserialize)]
pub struct UpdateHeadersRequest {
    pub headers: Vec<HeaderConfig>,
}

/// Replace a server's headers.
pub async fn update_headers(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateHeadersRequest>,
) -> Result<Json<McpServer>, HttpError> {
    Ok(Json(state.registry.update_headers(&id, req.headers).await?))
}

#[derive(Debug, Deserialize)]
pub struct SetEnabledRequest {
    pub enabled: bool,
}

/// Set the session-level enabled flag.
pub async fn set_enabled(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<SetEnabledRequest>,
) -> Result<(), HttpError> {
    state.registry.set_enabled(&id, req.enabled).await?;
    Ok(())
}
