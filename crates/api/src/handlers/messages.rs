//! Handler for inbound chat messages.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use raidwatch_core::interpreter::IncomingMessage;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::middleware::webhook_auth::RequireWebhookToken;
use crate::response::DataResponse;
use crate::state::AppState;

/// Reply payload for the chat adapter to post back into the channel.
#[derive(Debug, Serialize)]
pub struct MessageReply {
    /// `None` when the message was not a bot command.
    pub reply: Option<String>,
}

/// POST /api/v1/messages
///
/// Run one chat message through the command interpreter.
pub async fn receive(
    State(state): State<AppState>,
    _auth: RequireWebhookToken,
    Json(message): Json<IncomingMessage>,
) -> AppResult<impl IntoResponse> {
    if message.community_id.trim().is_empty() {
        return Err(AppError::BadRequest("community_id must not be empty".into()));
    }

    let reply = state
        .interpreter
        .handle(&message, chrono::Utc::now())
        .await;

    Ok(Json(DataResponse {
        data: MessageReply { reply },
    }))
}
