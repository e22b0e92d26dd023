use axum::routing::post;
use axum::Router;

use crate::handlers::messages;
use crate::state::AppState;

/// Chat webhook routes.
///
/// ```text
/// POST   /messages                  -> receive
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/messages", post(messages::receive))
}
