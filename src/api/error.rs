//! API error types with structured JSON responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::auth::AuthError;
use crate::export::ExportError;
use crate::generator::{GenerationError, IntakeError, PlanDataError, SaveError};
use crate::library::LibraryError;
use crate::models::ModelError;
use crate::registry::RegistryError;
use crate::store::StoreError;

/// Structured error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Authentication required")]
    Unauthorized,
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Stored plan data is malformed: {0}")]
    MalformedPlanData(String),
    #[error("Generation failed: {0}")]
    GenerationFailed(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "AUTH_REQUIRED",
                "Authentication required".to_string(),
            ),
            ApiError::NotFound(detail) => (StatusCode::NOT_FOUND, "NOT_FOUND", detail.clone()),
            ApiError::BadRequest(detail) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", detail.clone())
            }
            ApiError::Conflict(detail) => (StatusCode::CONFLICT, "CONFLICT", detail.clone()),
            ApiError::MalformedPlanData(detail) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "MALFORMED_PLAN_DATA",
                detail.clone(),
            ),
            ApiError::GenerationFailed(detail) => (
                StatusCode::BAD_GATEWAY,
                "GENERATION_FAILED",
                detail.clone(),
            ),
            ApiError::Internal(detail) => {
                tracing::error!(detail, "API internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = ErrorBody {
            error: ErrorDetail { code, message },
        };
        (status, Json(body)).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::NotAuthenticated => ApiError::Unauthorized,
            AuthError::Transport(detail) => ApiError::Internal(detail),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<RegistryError> for ApiError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::NotFound(id) => ApiError::NotFound(format!("No patient with id {id}")),
            RegistryError::Store(inner) => inner.into(),
        }
    }
}

impl From<LibraryError> for ApiError {
    fn from(err: LibraryError) -> Self {
        match err {
            LibraryError::NotFound(id) => ApiError::NotFound(format!("No plan with id {id}")),
            LibraryError::PlanData(inner) => inner.into(),
            LibraryError::Store(inner) => inner.into(),
        }
    }
}

impl From<PlanDataError> for ApiError {
    fn from(err: PlanDataError) -> Self {
        ApiError::MalformedPlanData(err.to_string())
    }
}

impl From<ModelError> for ApiError {
    fn from(err: ModelError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl From<IntakeError> for ApiError {
    fn from(err: IntakeError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl From<GenerationError> for ApiError {
    fn from(err: GenerationError) -> Self {
        match err {
            GenerationError::NotReady => ApiError::BadRequest(err.to_string()),
            GenerationError::AlreadyGenerated => ApiError::Conflict(err.to_string()),
            other => ApiError::GenerationFailed(other.to_string()),
        }
    }
}

impl From<SaveError> for ApiError {
    fn from(err: SaveError) -> Self {
        match err {
            SaveError::Invalid(inner) => inner.into(),
            SaveError::Store(inner) => inner.into(),
        }
    }
}

impl From<ExportError> for ApiError {
    fn from(err: ExportError) -> Self {
        ApiError::Internal(err.to_string())
    }
}
