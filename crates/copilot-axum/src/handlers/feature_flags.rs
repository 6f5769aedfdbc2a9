//! Feature flag handlers.

use axum::Json;
use axum::extract::State;
use copilot_core::FeatureFlags;

use crate::error::HttpError;
use crate::state::AppState;

pub async fn get(State(state): State<AppState>) -> Result<Json<FeatureFlags>, HttpError> {
    Ok(Json(state.workspace.feature_flags().await?))
}

/// Merge the given flags into the stored ones.
pub async fn update(
    State(state): State<AppState>,
    Json(flags): Json<FeatureFlags>,
) -> Result<Json<FeatureFlags>, HttpError> {
    Ok(Json(state.workspace.set_feature_flags(flags).await?))
}
