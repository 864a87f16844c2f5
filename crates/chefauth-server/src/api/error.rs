//! API error types and responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chefauth_core::ChefAuthError;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// API error type
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Permission denied: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Backend not configured")]
    NotConfigured,

    #[error("Chef server error: {0}")]
    BadGateway(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// API error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "PERMISSION_DENIED", msg.clone()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "ALREADY_EXISTS", msg.clone()),
            ApiError::NotConfigured => (
                StatusCode::SERVICE_UNAVAILABLE,
                "NOT_CONFIGURED",
                "no Chef host configured".to_string(),
            ),
            ApiError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, "CHEF_ERROR", msg.clone()),
            ApiError::Internal(msg) => {
                error!(error = %msg, "Internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg.clone())
            }
        };

        let body = ErrorResponse {
            error: message,
            code: code.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<ChefAuthError> for ApiError {
    fn from(err: ChefAuthError) -> Self {
        match err {
            ChefAuthError::Validation(msg) => ApiError::BadRequest(msg),
            ChefAuthError::NotConfigured => ApiError::NotConfigured,
            ChefAuthError::AuthDenied(_) => ApiError::Forbidden("permission denied".into()),
            ChefAuthError::AlreadyExists { .. } => ApiError::Conflict(err.to_string()),
            ChefAuthError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            ChefAuthError::Structural(_) | ChefAuthError::Inventory(_) => {
                ApiError::BadGateway(err.to_string())
            }
            ChefAuthError::Storage(_) | ChefAuthError::Decode { .. } => {
                ApiError::Internal(err.to_string())
            }
        }
    }
}
