//! Error type for the HTTP layer.
//!
//! Handlers return [`AppError`]; its [`IntoResponse`] impl renders the
//! `{ "success": false, "error": ..., "code": ... }` failure envelope.
//! Database and internal failures are logged server-side and replaced with
//! [`GENERIC_ERROR_MESSAGE`] on the wire, so driver and server details never
//! reach a client.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use dealflow_core::error::CoreError;
use serde_json::json;

/// What a client sees for any failure we cannot attribute to its request.
pub const GENERIC_ERROR_MESSAGE: &str = "An internal error occurred";

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Domain error bubbled up from `dealflow_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Storage failure from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The request itself was unacceptable.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Anything else that went wrong server-side.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Handler return type.
pub type AppResult<T> = Result<T, AppError>;

/// A body that fails to deserialize gets the same failure envelope as
/// every other error instead of axum's plain-text rejection. Handlers
/// opt in by taking `Result<Json<T>, JsonRejection>` and using `?`.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl AppError {
    /// Map the error onto a status code, a stable machine-readable code,
    /// and the message the client is allowed to see.
    fn wire_parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            Self::Core(CoreError::NotFound { entity, id }) => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                format!("{entity} with id {id} not found"),
            ),
            Self::Core(CoreError::Validation(msg)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            Self::Core(CoreError::Conflict(msg)) => {
                (StatusCode::CONFLICT, "CONFLICT", msg.clone())
            }
            Self::Core(CoreError::Internal(msg)) => {
                tracing::error!(error = %msg, "core internal error");
                sanitized_500()
            }
            Self::Database(sqlx::Error::RowNotFound) => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                "Resource not found".to_owned(),
            ),
            Self::Database(err) => {
                tracing::error!(error = %err, "database error");
                sanitized_500()
            }
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            Self::InternalError(msg) => {
                tracing::error!(error = %msg, "internal error");
                sanitized_500()
            }
        }
    }
}

fn sanitized_500() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        GENERIC_ERROR_MESSAGE.to_owned(),
    )
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.wire_parts();
        let body = json!({
            "success": false,
            "error": message,
            "code": code,
        });
        (status, axum::Json(body)).into_response()
    }
}
