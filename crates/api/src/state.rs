use std::sync::Arc;

use raidwatch_core::interpreter::Interpreter;
use raidwatch_core::store::BossStore;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Catalog and death-record storage (PostgreSQL or in-memory).
    pub store: Arc<dyn BossStore>,
    /// Command interpreter bound to `store`.
    pub interpreter: Arc<Interpreter>,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(store: Arc<dyn BossStore>, config: ServerConfig) -> Self {
        let interpreter = Interpreter::new(Arc::clone(&store), config.bot.clone());
        Self {
            store,
            interpreter: Arc::new(interpreter),
            config: Arc::new(config),
        }
    }
}
