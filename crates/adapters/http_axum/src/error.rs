//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use switchyard_domain::error::{DispatchError, ValidationError};

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Failures an API handler can answer with.
#[derive(Debug)]
pub enum ApiError {
    Dispatch(DispatchError),
    BadRequest(String),
}

impl From<DispatchError> for ApiError {
    fn from(err: DispatchError) -> Self {
        Self::Dispatch(err)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, message.clone()),
            Self::Dispatch(err) => {
                match err {
                    DispatchError::UnknownTarget(_) => (StatusCode::NOT_FOUND, err.to_string()),
                    DispatchError::UnsupportedAction { .. } => {
                        (StatusCode::BAD_REQUEST, err.to_string())
                    }
                    DispatchError::HandlerError { source, .. } => {
                        tracing::warn!(error = %err, cause = %source, "component handler failed");
                        (StatusCode::BAD_GATEWAY, format!("{err}: {source}"))
                    }
                    DispatchError::Timeout { .. } => {
                        tracing::warn!(error = %err, "component timed out");
                        (StatusCode::GATEWAY_TIMEOUT, err.to_string())
                    }
                }
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
