//! Error types for the sandbox API

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use thiserror::Error;

use crate::caption::CaptionError;
use crate::models::ErrorResponse;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid upload (400)
    #[error("{0}")]
    BadRequest(String),

    /// Validation failures are 400, caption failures 500
    #[error(transparent)]
    Caption(#[from] CaptionError),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Caption(err) if err.is_validation() => (
                StatusCode::BAD_REQUEST,
                format!("Invalid image format or file too large (max 10MB): {}", err),
            ),
            ApiError::Caption(err) => {
                tracing::error!("Caption error: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let message = if status.is_client_error() {
            "Request processing failed"
        } else {
            "Server encountered an unexpected error"
        };

        let body = ErrorResponse {
            error,
            message: message.to_string(),
            timestamp: Utc::now(),
        };

        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
