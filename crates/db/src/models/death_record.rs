//! Death record row models.
//!
//! Maps to the `death_records` table, plus the joined shape used by the
//! summary listings.

use raidwatch_core::catalog::{CatalogEntry, DeathRecord};
use raidwatch_core::error::CoreError;
use raidwatch_core::types::Timestamp;
use serde::Serialize;
use sqlx::FromRow;

use super::catalog::CatalogRow;

/// A row from the `death_records` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DeathRecordRow {
    pub boss_id: String,
    pub community_id: String,
    pub death_time: Timestamp,
    pub reported_by: String,
    pub updated_at: Timestamp,
}

impl From<DeathRecordRow> for DeathRecord {
    fn from(row: DeathRecordRow) -> Self {
        DeathRecord {
            boss_id: row.boss_id,
            community_id: row.community_id,
            death_time: row.death_time,
            reported_by: row.reported_by,
            updated_at: row.updated_at,
        }
    }
}

/// A death record joined with its catalog entry.
#[derive(Debug, Clone, FromRow)]
pub struct TrackedRow {
    #[sqlx(flatten)]
    pub record: DeathRecordRow,
    pub catalog_id: i64,
    pub scope: String,
    pub timer_ms: i64,
    pub window_hours: i32,
    pub category: String,
    pub added_by: String,
    pub created_at: Timestamp,
}

impl TrackedRow {
    /// Split into the core record and catalog entry.
    pub fn into_pair(self) -> Result<(DeathRecord, CatalogEntry), CoreError> {
        let entry = CatalogEntry::try_from(CatalogRow {
            id: self.catalog_id,
            scope: self.scope,
            boss_id: self.record.boss_id.clone(),
            timer_ms: self.timer_ms,
            window_hours: self.window_hours,
            category: self.category,
            added_by: self.added_by,
            created_at: self.created_at,
        })?;
        Ok((self.record.into(), entry))
    }
}
