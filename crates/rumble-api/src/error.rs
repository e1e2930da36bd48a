//! Rumble arena — API error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use rumble_core::error::RoundError;
use serde::Serialize;
use thiserror::Error;

/// Startup and runtime errors for the API server.
#[derive(Debug, Error)]
pub enum AppError {
    /// An environment variable is invalid.
    #[error("configuration error: {0}")]
    Config(String),

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
}

/// HTTP-layer wrapper around `RoundError` that implements `IntoResponse`.
#[derive(Debug)]
pub struct ApiError(pub RoundError);

impl From<RoundError> for ApiError {
    fn from(err: RoundError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            RoundError::Validation(_) => StatusCode::BAD_REQUEST,
            RoundError::StateConflict(_) => StatusCode::CONFLICT,
            RoundError::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            RoundError::ClockBusy | RoundError::CollaboratorFailure(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = ErrorBody {
            error: self.0.code(),
            message: self.0.to_string(),
        };

        (status, Json(body)).into_response()
    }
}
