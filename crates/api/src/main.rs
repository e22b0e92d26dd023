use std::net::SocketAddr;
use std::sync::Arc;

use raidwatch_core::catalog::{CatalogScope, GLOBAL_SCOPE};
use raidwatch_core::store::{seed_default_catalog, BossStore, MemoryBossStore};
use raidwatch_db::PgBossStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use raidwatch_api::config::{ServerConfig, StoreBackend};
use raidwatch_api::router::build_app_router;
use raidwatch_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "raidwatch_api=debug,raidwatch_core=info,raidwatch_db=info,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(
        host = %config.host,
        port = %config.port,
        backend = ?config.store_backend,
        scope = ?config.bot.catalog_scope,
        "Loaded server configuration"
    );

    // --- Store ---
    let store = connect_store(&config).await;

    if config.seed_default_catalog {
        match config.bot.catalog_scope {
            CatalogScope::Global => {
                let inserted = seed_default_catalog(store.as_ref(), GLOBAL_SCOPE)
                    .await
                    .expect("Failed to seed default boss catalog");
                tracing::info!(inserted, "Default boss catalog seeded");
            }
            CatalogScope::Community => {
                tracing::warn!("SEED_DEFAULT_CATALOG ignored: catalogs are per community");
            }
        }
    }

    // --- Router ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    let app = build_app_router(AppState::new(store, config));

    // --- Start server ---
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Graceful shutdown complete");
}

/// Build the configured store, connecting and migrating when it is PostgreSQL.
async fn connect_store(config: &ServerConfig) -> Arc<dyn BossStore> {
    match config.store_backend {
        StoreBackend::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .expect("DATABASE_URL must be set when STORE_BACKEND=postgres");

            let pool = raidwatch_db::create_pool(database_url, config.db_max_connections)
                .await
                .expect("Failed to connect to database");
            tracing::info!("Database connection pool created");

            raidwatch_db::health_check(&pool)
                .await
                .expect("Database health check failed");
            tracing::info!("Database health check passed");

            raidwatch_db::run_migrations(&pool)
                .await
                .expect("Failed to run database migrations");
            tracing::info!("Database migrations applied");

            Arc::new(PgBossStore::new(pool))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using the in-memory store; records are lost on restart");
            Arc::new(MemoryBossStore::new())
        }
    }
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
