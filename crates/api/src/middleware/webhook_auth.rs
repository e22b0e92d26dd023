//! Shared-secret check for the chat adapter.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::state::AppState;

/// Passes when `WEBHOOK_TOKEN` is unset, or when the request carries
/// `Authorization: Bearer <WEBHOOK_TOKEN>`. Rejects with 401 otherwise.
///
/// ```ignore
/// async fn handler(_auth: RequireWebhookToken) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequireWebhookToken;

impl FromRequestParts<AppState> for RequireWebhookToken {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(expected) = state.config.webhook_token.as_deref() else {
            return Ok(RequireWebhookToken);
        };

        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".into()))?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::Unauthorized("Invalid Authorization format. Expected: Bearer <token>".into())
        })?;

        if token != expected {
            tracing::warn!("Rejected webhook call with a wrong token");
            return Err(AppError::Unauthorized("Invalid webhook token".into()));
        }

        Ok(RequireWebhookToken)
    }
}
