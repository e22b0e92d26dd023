pub mod health;
pub mod messages;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /messages        inbound chat message -> reply text (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().merge(messages::router())
}
