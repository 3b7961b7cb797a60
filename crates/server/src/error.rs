// crates/server/src/error.rs
use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use parcelwise_core::{LlmError, UnsupportedProvider};
use parcelwise_db::DbError;
use serde::Serialize;
use thiserror::Error;

/// JSON error body: `{"detail": "..."}`.
#[derive(Debug, Serialize)]
#[cfg_attr(test, derive(serde::Deserialize))]
pub struct ErrorResponse {
    pub detail: String,
}

impl ErrorResponse {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

/// API error types that map to HTTP status codes
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed request body, path or query.
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    UnsupportedProvider(#[from] UnsupportedProvider),

    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error(transparent)]
    Database(DbError),

    #[error("{0}")]
    Internal(String),
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Conflict => ApiError::BadRequest(err.to_string()),
            other => ApiError::Database(other),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::BadRequest(_) | ApiError::UnsupportedProvider(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Llm(_) | ApiError::Database(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match &self {
            ApiError::Validation(msg) => tracing::warn!(message = %msg, "Validation failed"),
            ApiError::BadRequest(msg) => tracing::warn!(message = %msg, "Bad request"),
            ApiError::NotFound(msg) => tracing::debug!(message = %msg, "Not found"),
            ApiError::UnsupportedProvider(e) => {
                tracing::warn!(provider = %e.name, "Unsupported LLM provider")
            }
            ApiError::Llm(e) => tracing::error!(error = %e, "LLM provider error"),
            ApiError::Database(e) => tracing::error!(error = %e, "Database error"),
            ApiError::Internal(msg) => tracing::error!(message = %msg, "Internal server error"),
        }

        (status, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}

/// Result type alias for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
