//! API token handlers.

use axum::Json;
use axum::extract::{Path, State};
use copilot_core::{NewToken, Token};

use crate::error::HttpError;
use crate::state::AppState;

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Token>>, HttpError> {
    Ok(Json(state.workspace.list_tokens().await?))
}

pub async fn add(
    State(state): State<AppState>,
    Json(req): Json<NewToken>,
) -> Result<Json<Token>, HttpError> {
    Ok(Json(state.workspace.add_token(req).await?))
}

pub async fn remove(State(state): State<AppState>, Path(id): Path<String>) -> Result<(), HttpError> {
    state.workspace.delete_token(&id).await?;
    Ok(())
}

/// Make a token the active one for its category and provider.
pub async fn activate(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Token>, HttpError> {
    Ok(Json(state.workspace.activate_token(&id).await?))
}
