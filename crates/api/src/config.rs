use std::str::FromStr;

use raidwatch_core::catalog::{CatalogScope, ValidationBounds};
use raidwatch_core::interpreter::InterpreterConfig;
use raidwatch_core::time::TimeFormat;

/// Which [`BossStore`](raidwatch_core::store::BossStore) backend to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StoreBackend::Postgres),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(format!("unknown store backend '{other}'")),
        }
    }
}

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development except
/// `DATABASE_URL`, which the `postgres` backend requires.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    pub store_backend: StoreBackend,
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    /// Shared secret the chat adapter must send as a Bearer token.
    /// `None` disables the check.
    pub webhook_token: Option<String>,
    /// Insert the built-in boss list on startup.
    pub seed_default_catalog: bool,
    /// Command interpreter behaviour.
    pub bot: InterpreterConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default     |
    /// |------------------------|-------------|
    /// | `HOST`                 | `0.0.0.0`   |
    /// | `PORT`                 | `3000`      |
    /// | `REQUEST_TIMEOUT_SECS` | `30`        |
    /// | `STORE_BACKEND`        | `postgres`  |
    /// | `DATABASE_URL`         | (none)      |
    /// | `DB_MAX_CONNECTIONS`   | `10`        |
    /// | `WEBHOOK_TOKEN`        | (none)      |
    /// | `SEED_DEFAULT_CATALOG` | `true`      |
    /// | `COMMAND_PREFIX`       | `!`         |
    /// | `CATALOG_SCOPE`        | `global`    |
    /// | `TIME_FORMAT`          | `discord`   |
    /// | `TIMER_HOURS_MIN`      | `1`         |
    /// | `TIMER_HOURS_MAX`      | `999`       |
    /// | `WINDOW_HOURS_MIN`     | `1`         |
    /// | `WINDOW_HOURS_MAX`     | `9`         |
    /// | `ADMIN_ONLY_ADD`       | `false`     |
    ///
    /// Panics on unparseable values, and on hour bounds that are zero,
    /// inverted, or too large, so misconfiguration fails at startup.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port: u16 = env_parse("PORT", "3000");
        let request_timeout_secs: u64 = env_parse("REQUEST_TIMEOUT_SECS", "30");

        let store_backend: StoreBackend = env_parse("STORE_BACKEND", "postgres");
        let database_url = non_empty_var("DATABASE_URL");
        let db_max_connections: u32 = env_parse("DB_MAX_CONNECTIONS", "10");
        let webhook_token = non_empty_var("WEBHOOK_TOKEN");
        let seed_default_catalog: bool = env_parse("SEED_DEFAULT_CATALOG", "true");

        let defaults = ValidationBounds::default();
        let bounds = ValidationBounds {
            timer_hours: env_parse("TIMER_HOURS_MIN", &defaults.timer_hours.start().to_string())
                ..=env_parse("TIMER_HOURS_MAX", &defaults.timer_hours.end().to_string()),
            window_hours: env_parse("WINDOW_HOURS_MIN", &defaults.window_hours.start().to_string())
                ..=env_parse("WINDOW_HOURS_MAX", &defaults.window_hours.end().to_string()),
        };
        if let Err(e) = bounds.check_consistent() {
            panic!("TIMER_HOURS_*/WINDOW_HOURS_* are inconsistent: {e}");
        }

        let bot = InterpreterConfig {
            prefix: std::env::var("COMMAND_PREFIX").unwrap_or_else(|_| "!".into()),
            catalog_scope: env_parse::<CatalogScope>("CATALOG_SCOPE", "global"),
            time_format: env_parse::<TimeFormat>("TIME_FORMAT", "discord"),
            bounds,
            admin_only_add: env_parse("ADMIN_ONLY_ADD", "false"),
        };

        Self {
            host,
            port,
            request_timeout_secs,
            store_backend,
            database_url,
            db_max_connections,
            webhook_token,
            seed_default_catalog,
            bot,
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse<T>(key: &str, default: &str) -> T
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = std::env::var(key).unwrap_or_else(|_| default.to_string());
    raw.parse()
        .unwrap_or_else(|e| panic!("{key} has an invalid value '{raw}': {e}"))
}
