//! Workspace export and import.

use axum::Json;
use axum::extract::State;
use copilot_core::ExportBundle;
use serde::Serialize;
use serde_json::Value;

use crate::error::HttpError;
use crate::state::AppState;

/// GET /api/export
pub async fn export(State(state): State<AppState>) -> Result<Json<ExportBundle>, HttpError> {
    Ok(Json(state.workspace.export().await?))
}

/// Counts of what an import replaced.
#[derive(Debug, Serialize)]
pub struct ImportSummary {
    pub tokens: usize,
    pub servers: usize,
    pub instances: usize,
}

/// POST /api/import
///
/// The body is taken as raw JSON so structural problems surface as a 400
/// with the validation message.
pub async fn import(
    State(state): State<AppState>,
    Json(data): Json<Value>,
) -> Result<Json<ImportSummary>, HttpError> {
    let bundle = state.workspace.import(data).await?;
    Ok(Json(ImportSummary {
        tokens: bundle.tokens.len(),
        servers: bundle.servers.len(),
        instances: bundle.instances.len(),
    }))
}
