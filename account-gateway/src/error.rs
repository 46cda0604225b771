// Gateway error handling
// Maps engine errors and request validation failures onto HTTP responses

use account_core::Error;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use tracing::error;

/// Errors surfaced by the HTTP layer
///
/// `Validation` collects every failed request check so a caller sees all
/// of them at once. `Engine` wraps whatever the command or query side
/// returned; the status code depends on the inner error.
pub enum ApiError {
    Validation(Vec<String>),
    Engine(Error),
    Internal(String),
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError::Engine(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, errors) = match self {
            ApiError::Validation(errors) => (StatusCode::BAD_REQUEST, errors),
            ApiError::Engine(err) => match &err {
                Error::DuplicatedTransaction(_) => (StatusCode::CONFLICT, vec![err.to_string()]),
                Error::AccountNotInitialized(_) => (StatusCode::NOT_FOUND, vec![err.to_string()]),
                e if e.is_domain() => (StatusCode::BAD_REQUEST, vec![err.to_string()]),
                _ => {
                    // Infrastructure faults stay opaque to callers
                    error!("Command failed: {}", err);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        vec!["Internal server error".to_string()],
                    )
                }
            },
            ApiError::Internal(message) => {
                error!("Internal error: {}", message);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    vec!["Internal server error".to_string()],
                )
            }
        };

        (
            status,
            Json(serde_json::json!({
                "errors": errors,
                "timestamp": Utc::now(),
            })),
        )
            .into_response()
    }
}
