//! Repository for the `death_records` table.

use raidwatch_core::types::Timestamp;
use sqlx::PgPool;

use crate::models::death_record::{DeathRecordRow, TrackedRow};

const COLUMNS: &str = "boss_id, community_id, death_time, reported_by, updated_at";

/// Provides upsert and read operations for death records.
pub struct DeathRecordRepo;

impl DeathRecordRepo {
    /// Insert or replace the record for `(boss_id, community_id)`.
    ///
    /// A single `INSERT .. ON CONFLICT` statement, so concurrent reports for
    /// the same boss serialize on the primary key and the last one wins.
    pub async fn upsert(
        pool: &PgPool,
        boss_id: &str,
        community_id: &str,
        death_time: Timestamp,
        reported_by: &str,
        updated_at: Timestamp,
    ) -> Result<DeathRecordRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO death_records (boss_id, community_id, death_time, reported_by, updated_at)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (boss_id, community_id)
             DO UPDATE SET
                death_time  = EXCLUDED.death_time,
                reported_by = EXCLUDED.reported_by,
                updated_at  = EXCLUDED.updated_at
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DeathRecordRow>(&query)
            .bind(boss_id)
            .bind(community_id)
            .bind(death_time)
            .bind(reported_by)
            .bind(updated_at)
            .fetch_one(pool)
            .await
    }

    pub async fn find(
        pool: &PgPool,
        boss_id: &str,
        community_id: &str,
    ) -> Result<Option<DeathRecordRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM death_records
             WHERE boss_id = $1 AND community_id = $2"
        );
        sqlx::query_as::<_, DeathRecordRow>(&query)
            .bind(boss_id)
            .bind(community_id)
            .fetch_optional(pool)
            .await
    }

    /// Records in a community joined with their catalog entry in `scope`.
    ///
    /// Inner join: records whose boss was removed from the catalog are skipped.
    pub async fn list_tracked(
        pool: &PgPool,
        community_id: &str,
        scope: &str,
        category: Option<&str>,
    ) -> Result<Vec<TrackedRow>, sqlx::Error> {
        sqlx::query_as::<_, TrackedRow>(
            "SELECT d.boss_id, d.community_id, d.death_time, d.reported_by, d.updated_at,
                    c.id AS catalog_id, c.scope, c.timer_ms, c.window_hours,
                    c.category, c.added_by, c.created_at
             FROM death_records d
             JOIN boss_catalog c ON c.boss_id = d.boss_id AND c.scope = $2
             WHERE d.community_id = $1
               AND ($3::TEXT IS NULL OR c.category = $3)
             ORDER BY d.boss_id",
        )
        .bind(community_id)
        .bind(scope)
        .bind(category)
        .fetch_all(pool)
        .await
    }
}
