//! [`BossStore`] backed by PostgreSQL.

use async_trait::async_trait;
use raidwatch_core::catalog::{BossCategory, CatalogEntry, DeathRecord, NewCatalogEntry};
use raidwatch_core::error::CoreError;
use raidwatch_core::store::{BossStore, RemovalOutcome};
use raidwatch_core::types::Timestamp;

use crate::repositories::{CatalogRepo, DeathRecordRepo};
use crate::DbPool;

/// PostgreSQL unique-violation SQLSTATE.
const UNIQUE_VIOLATION: &str = "23505";
/// PostgreSQL check-violation SQLSTATE.
const CHECK_VIOLATION: &str = "23514";

#[derive(Clone)]
pub struct PgBossStore {
    pool: DbPool,
}

impl PgBossStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Translate a sqlx failure into the domain error taxonomy.
///
/// Unique violations become [`CoreError::Duplicate`], CHECK violations
/// [`CoreError::Validation`]; everything else means the store could not
/// serve the request.
pub fn classify_sqlx_error(err: sqlx::Error) -> CoreError {
    if let sqlx::Error::Database(db_err) = &err {
        let constraint = db_err.constraint().unwrap_or("unknown");
        match db_err.code().as_deref() {
            Some(UNIQUE_VIOLATION) => {
                return CoreError::Duplicate(format!(
                    "That boss is already in the catalog ({constraint})"
                ));
            }
            Some(CHECK_VIOLATION) => {
                return CoreError::Validation(format!(
                    "The catalog refused that entry ({constraint})"
                ));
            }
            _ => {}
        }
    }
    tracing::error!(error = %err, "Database error");
    CoreError::StoreUnavailable(err.to_string())
}

#[async_trait]
impl BossStore for PgBossStore {
    async fn lookup(&self, boss_id: &str, scope: &str) -> Result<Option<CatalogEntry>, CoreError> {
        CatalogRepo::find(&self.pool, scope, boss_id)
            .await
            .map_err(classify_sqlx_error)?
            .map(CatalogEntry::try_from)
            .transpose()
    }

    async fn add(&self, entry: NewCatalogEntry) -> Result<CatalogEntry, CoreError> {
        entry.stored_window_hours()?;
        let row = CatalogRepo::create(&self.pool, &entry)
            .await
            .map_err(|err| match classify_sqlx_error(err) {
                CoreError::Duplicate(_) => CoreError::Duplicate(format!(
                    "'{}' is already in the catalog",
                    entry.boss_id
                )),
                other => other,
            })?;
        row.try_into()
    }

    async fn remove(&self, boss_id: &str, scope: &str) -> Result<RemovalOutcome, CoreError> {
        let orphaned = CatalogRepo::delete(&self.pool, scope, boss_id)
            .await
            .map_err(classify_sqlx_error)?
            .ok_or_else(|| CoreError::boss_not_found(boss_id))?;
        Ok(RemovalOutcome {
            orphaned_records: orphaned.max(0) as u64,
        })
    }

    async fn list(
        &self,
        scope: &str,
        category: Option<BossCategory>,
    ) -> Result<Vec<CatalogEntry>, CoreError> {
        CatalogRepo::list(&self.pool, scope, category.as_ref().map(BossCategory::as_str))
            .await
            .map_err(classify_sqlx_error)?
            .into_iter()
            .map(CatalogEntry::try_from)
            .collect()
    }

    async fn upsert_death(
        &self,
        boss_id: &str,
        community_id: &str,
        death_time: Timestamp,
        reported_by: &str,
        now: Timestamp,
    ) -> Result<DeathRecord, CoreError> {
        let row = DeathRecordRepo::upsert(
            &self.pool,
            boss_id,
            community_id,
            death_time,
            reported_by,
            now,
        )
        .await
        .map_err(classify_sqlx_error)?;
        Ok(row.into())
    }

    async fn get_death(
        &self,
        boss_id: &str,
        community_id: &str,
    ) -> Result<Option<DeathRecord>, CoreError> {
        let row = DeathRecordRepo::find(&self.pool, boss_id, community_id)
            .await
            .map_err(classify_sqlx_error)?;
        Ok(row.map(Into::into))
    }

    async fn list_tracked(
        &self,
        community_id: &str,
        scope: &str,
        category: Option<BossCategory>,
    ) -> Result<Vec<(DeathRecord, CatalogEntry)>, CoreError> {
        DeathRecordRepo::list_tracked(
            &self.pool,
            community_id,
            scope,
            category.as_ref().map(BossCategory::as_str),
        )
        .await
        .map_err(classify_sqlx_error)?
        .into_iter()
        .map(|row| row.into_pair())
        .collect()
    }

    async fn health_check(&self) -> Result<(), CoreError> {
        crate::health_check(&self.pool)
            .await
            .map_err(classify_sqlx_error)
    }
}
