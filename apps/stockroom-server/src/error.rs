//! API error taxonomy and its HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use stockroom_storage::StoreError;

/// Every failure a handler can surface. Each variant carries a
/// human-readable message; nothing is silently dropped.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unauthorized: Please log in")]
    Unauthorized,
    #[error("Forbidden: {0}")]
    Forbidden(&'static str),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("Invalid credentials")]
    InvalidCredential,
    #[error("{0}")]
    Validation(String),
    #[error("Insufficient stock")]
    InsufficientStock,
    #[error("{0}")]
    Conflict(String),
    #[error("Server error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InvalidCredential => StatusCode::BAD_REQUEST,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::InsufficientStock => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(ref detail) = self {
            tracing::error!(%detail, "request failed");
        }
        (self.status(), Json(json!({ "message": self.to_string() }))).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound => ApiError::NotFound("Record"),
            StoreError::AlreadyExists => ApiError::Conflict("Already exists".to_string()),
            StoreError::InsufficientStock => ApiError::InsufficientStock,
            StoreError::Backend(msg) => ApiError::Internal(msg),
        }
    }
}

impl From<stockroom_crypto::HashError> for ApiError {
    fn from(e: stockroom_crypto::HashError) -> Self {
        ApiError::Internal(e.to_string())
    }
}
