//! Repository for the `boss_catalog` table.

use raidwatch_core::catalog::{NewCatalogEntry, GLOBAL_SCOPE};
use sqlx::PgPool;

use crate::models::catalog::CatalogRow;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "\
    id, scope, boss_id, timer_ms, window_hours, \
    category, added_by, created_at";

/// Provides CRUD operations for catalog entries.
pub struct CatalogRepo;

impl CatalogRepo {
    /// Find an entry by name within a scope.
    pub async fn find(
        pool: &PgPool,
        scope: &str,
        boss_id: &str,
    ) -> Result<Option<CatalogRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM boss_catalog
             WHERE scope = $1 AND boss_id = $2"
        );
        sqlx::query_as::<_, CatalogRow>(&query)
            .bind(scope)
            .bind(boss_id)
            .fetch_optional(pool)
            .await
    }

    /// Insert a new entry. A name clash in the same scope violates
    /// `uq_boss_catalog_scope_boss`.
    pub async fn create(pool: &PgPool, input: &NewCatalogEntry) -> Result<CatalogRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO boss_catalog (scope, boss_id, timer_ms, window_hours, category, added_by)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CatalogRow>(&query)
            .bind(&input.scope)
            .bind(&input.boss_id)
            .bind(input.respawn_timer_ms())
            .bind(i32::try_from(input.window_hours).map_err(|e| sqlx::Error::Encode(Box::new(e)))?)
            .bind(input.category.as_str())
            .bind(&input.added_by)
            .fetch_one(pool)
            .await
    }

    /// Delete an entry and count the death records it leaves behind.
    ///
    /// Returns `None` if no entry matched. In the global scope every
    /// community's records count; otherwise only the scope's own community.
    pub async fn delete(
        pool: &PgPool,
        scope: &str,
        boss_id: &str,
    ) -> Result<Option<i64>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let deleted = sqlx::query("DELETE FROM boss_catalog WHERE scope = $1 AND boss_id = $2")
            .bind(scope)
            .bind(boss_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        if deleted == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        let (orphaned,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM death_records
             WHERE boss_id = $1 AND ($2::TEXT = $3::TEXT OR community_id = $2)",
        )
        .bind(boss_id)
        .bind(scope)
        .bind(GLOBAL_SCOPE)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(orphaned))
    }

    /// List entries in a scope, optionally filtered by category, ordered by
    /// name case-insensitively.
    pub async fn list(
        pool: &PgPool,
        scope: &str,
        category: Option<&str>,
    ) -> Result<Vec<CatalogRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM boss_catalog
             WHERE scope = $1 AND ($2::TEXT IS NULL OR category = $2)
             ORDER BY LOWER(boss_id), boss_id"
        );
        sqlx::query_as::<_, CatalogRow>(&query)
            .bind(scope)
            .bind(category)
            .fetch_all(pool)
            .await
    }
}
