//! Axum-specific error types and mappings.
//!
//! Maps the core service errors to HTTP status codes and a JSON
//! `{error, status}` body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use copilot_core::{RegistryError, RepositoryError, WorkspaceError};
use serde::Serialize;
use thiserror::Error;

/// Axum-specific error type.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request (invalid input).
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Conflict (resource already exists).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// JSON error response body.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
    status: u16,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::Conflict(msg) => (StatusCode::CONFLICT, msg),
            Self::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %message, "Request failed");
        }

        let body = ErrorBody {
            error: message,
            status: status.as_u16(),
        };
        (status, axum::Json(body)).into_response()
    }
}

impl From<RepositoryError> for HttpError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(msg) => Self::NotFound(msg),
            RepositoryError::Storage(msg) => Self::Internal(format!("Storage: {msg}")),
            RepositoryError::Serialization(msg) => Self::Internal(format!("Serialization: {msg}")),
        }
    }
}

impl From<RegistryError> for HttpError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::NotFound(_) | RegistryError::UnknownPreset(_) => {
                Self::NotFound(err.to_string())
            }
            RegistryError::Conflict(_) => Self::Conflict(err.to_string()),
            RegistryError::Invalid(msg) => Self::BadRequest(msg),
            RegistryError::Repository(repo_err) => repo_err.into(),
        }
    }
}

impl From<WorkspaceError> for HttpError {
    fn from(err: WorkspaceError) -> Self {
        match err {
            WorkspaceError::NotFound(_) => Self::NotFound(err.to_string()),
            WorkspaceError::Invalid(msg) => Self::BadRequest(msg),
            WorkspaceError::Registry(registry_err) => registry_err.into(),
            WorkspaceError::Repository(repo_err) => repo_err.into(),
        }
    }
}
