#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use raidwatch_core::catalog::GLOBAL_SCOPE;
use raidwatch_core::interpreter::InterpreterConfig;
use raidwatch_core::store::{seed_default_catalog, BossStore, MemoryBossStore};
use raidwatch_core::time::TimeFormat;
use tower::ServiceExt;

use raidwatch_api::config::{ServerConfig, StoreBackend};
use raidwatch_api::router::build_app_router;
use raidwatch_api::state::AppState;

/// Build a test `ServerConfig` with safe defaults and the in-memory store.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        request_timeout_secs: 30,
        store_backend: StoreBackend::Memory,
        database_url: None,
        db_max_connections: 1,
        webhook_token: None,
        seed_default_catalog: true,
        bot: InterpreterConfig {
            time_format: TimeFormat::Utc,
            ..InterpreterConfig::default()
        },
    }
}

/// Build the full application router over a seeded in-memory store.
///
/// Returns the store as well so tests can inspect what a request wrote.
pub async fn build_test_app(config: ServerConfig) -> (Router, Arc<MemoryBossStore>) {
    let store = Arc::new(MemoryBossStore::new());
    seed_default_catalog(store.as_ref(), GLOBAL_SCOPE)
        .await
        .expect("seeding the memory store cannot fail");

    let dyn_store: Arc<dyn BossStore> = store.clone();
    let app = build_app_router(AppState::new(dyn_store, config));
    (app, store)
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    post_json_with_auth(app, uri, body, None).await
}

pub async fn post_json_with_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    bearer: Option<&str>,
) -> Response<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = bearer {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    app.oneshot(builder.body(Body::from(body.to_string())).unwrap())
        .await
        .unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// A chat message payload from `guild-1`.
pub fn message(content: &str, is_admin: bool) -> serde_json::Value {
    serde_json::json!({
        "community_id": "guild-1",
        "author": "alice",
        "is_admin": is_admin,
        "content": content,
    })
}
