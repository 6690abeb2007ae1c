use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

use crate::common::error::BackendError;

/// An error ready to be sent to the client: `{message, error?}` with an
/// HTTP status. Handlers are the sole translation point from internal
/// errors; anything unexpected becomes a generic 500 with the cause kept
/// server-side in the log.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    detail: Option<String>,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
            detail: None,
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: message.into(),
            detail: None,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
            detail: None,
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::CONFLICT,
            message: message.into(),
            detail: None,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
            detail: Some("Internal error occurred.".to_string()),
        }
    }

    /// Translate a backend failure, using `context` as the user-facing
    /// message for anything that isn't the client's fault. The full cause
    /// is logged, never leaked.
    pub fn from_backend(context: &str, err: BackendError) -> Self {
        match err {
            BackendError::Validation(message) => Self::bad_request(message),
            BackendError::Auth(message) => Self::unauthorized(message),
            other => {
                error!("{context}: {other}");
                Self::internal(context)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match &self.detail {
            Some(detail) => json!({ "message": self.message, "error": detail }),
            None => json!({ "message": self.message }),
        };
        (self.status, Json(body)).into_response()
    }
}
