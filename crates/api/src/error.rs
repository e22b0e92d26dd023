use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use raidwatch_core::error::CoreError;
use serde_json::json;

/// Error type for HTTP handlers, rendered as a `{error, code}` JSON envelope.
///
/// Chat commands never surface here: the interpreter turns their failures
/// into reply text. What remains is the request envelope itself (auth, body
/// checks) and store failures seen by the health probe.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `raidwatch_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Missing or wrong webhook credentials.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Core(CoreError::StoreUnavailable(msg)) => {
                tracing::error!(error = %msg, "Store unavailable");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "STORE_UNAVAILABLE",
                    "The store is unavailable".to_string(),
                )
            }
            // Command failures are replies, not HTTP errors; anything else
            // that reaches here is the caller's input.
            AppError::Core(core) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", core.to_string()),

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::Unauthorized(msg) => {
                (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}
