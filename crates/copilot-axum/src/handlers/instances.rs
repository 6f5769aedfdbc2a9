//! Sitecore instance handlers.

use axum::Json;
use axum::extract::{Path, State};
use copilot_core::{Instance, NewInstance};

use crate::error::HttpError;
use crate::state::AppState;

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Instance>>, HttpError> {
    Ok(Json(state.workspace.list_instances().await?))
}

pub async fn add(
    State(state): State<AppState>,
    Json(req): Json<NewInstance>,
) -> Result<Json<Instance>, HttpError> {
    Ok(Json(state.workspace.add_instance(req).await?))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<NewInstance>,
) -> Result<Json<Instance>, HttpError> {
    Ok(Json(state.workspace.update_instance(&id, req).await?))
}

pub async fn remove(State(state): State<AppState>, Path(id): Path<String>) -> Result<(), HttpError> {
    state.workspace.delete_instance(&id).await?;
    Ok(())
}
