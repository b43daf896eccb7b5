//! Error types for pdw-ingest
//!
//! [`IngestError`] keeps every ingest failure distinguishable up to the HTTP
//! boundary, where [`ApiError`] maps it onto a status code.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::mapping::MappingNotFoundError;
use crate::plugins::{PluginNotFoundError, TransformError};
use crate::units::UnsupportedUnitError;

/// Ingest pipeline failure
#[derive(Debug, Error)]
pub enum IngestError {
    /// Malformed or incomplete payload
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    PluginNotFound(#[from] PluginNotFoundError),

    #[error(transparent)]
    MappingNotFound(#[from] MappingNotFoundError),

    /// Unit normalization failure
    #[error(transparent)]
    Normalization(#[from] UnsupportedUnitError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<TransformError> for IngestError {
    fn from(err: TransformError) -> Self {
        IngestError::Validation(err.to_string())
    }
}

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Missing or wrong admin token (401)
    #[error("Unauthorized")]
    Unauthorized,

    #[error(transparent)]
    Ingest(#[from] IngestError),

    /// pdw-common error
    #[error("Common error: {0}")]
    Common(#[from] pdw_common::Error),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Missing or invalid admin token".to_string(),
            ),
            ApiError::Ingest(ref err) => {
                let (status, code) = match err {
                    IngestError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
                    IngestError::PluginNotFound(_) => {
                        (StatusCode::BAD_REQUEST, "PLUGIN_NOT_FOUND")
                    }
                    IngestError::MappingNotFound(_) => {
                        (StatusCode::UNPROCESSABLE_ENTITY, "MAPPING_NOT_FOUND")
                    }
                    IngestError::Normalization(_) => (StatusCode::BAD_REQUEST, "UNSUPPORTED_UOM"),
                    IngestError::Database(_) => {
                        (StatusCode::INTERNAL_SERVER_ERROR, "DATABASE_ERROR")
                    }
                };
                (status, code, err.to_string())
            }
            ApiError::Common(ref err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "COMMON_ERROR",
                err.to_string(),
            ),
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
