//! Chronicle: API error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chronicle_core::error::DomainError;
use chronicle_core::validation::ValidationError;
use serde::Serialize;
use thiserror::Error;

/// Startup and runtime errors for the API server.
#[derive(Debug, Error)]
pub enum AppError {
    /// A required environment variable is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// Opening the store or rebuilding the read models failed.
    #[error("startup failed: {0}")]
    Domain(#[from] DomainError),

    /// Network binding or I/O error.
    #[error("server error: {0}")]
    Server(#[from] std::io::Error),
}

/// JSON body returned for error responses.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code.
    pub error: &'static str,
    /// Human-readable error message.
    pub message: String,
    /// Rejected fields and their violations, for validation errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<ValidationError>,
}

/// HTTP-layer wrapper around `DomainError` that implements `IntoResponse`.
#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, fields) = match &self.0 {
            DomainError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found", None),
            DomainError::Validation(verr) => (
                StatusCode::BAD_REQUEST,
                "validation_error",
                Some(verr.clone()),
            ),
            DomainError::Storage(err) => {
                tracing::error!(error = %err, "storage failure while handling request");
                (StatusCode::INTERNAL_SERVER_ERROR, "storage_error", None)
            }
        };

        let body = ErrorBody {
            error: error_code,
            message: self.0.to_string(),
            fields,
        };

        (status, Json(body)).into_response()
    }
}
