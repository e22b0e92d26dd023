//! Boss catalog row model.
//!
//! Maps to the `boss_catalog` table.

use raidwatch_core::catalog::{BossCategory, CatalogEntry};
use raidwatch_core::error::CoreError;
use raidwatch_core::types::Timestamp;
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `boss_catalog` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CatalogRow {
    pub id: i64,
    pub scope: String,
    pub boss_id: String,
    pub timer_ms: i64,
    pub window_hours: i32,
    pub category: String,
    pub added_by: String,
    pub created_at: Timestamp,
}

impl TryFrom<CatalogRow> for CatalogEntry {
    type Error = CoreError;

    fn try_from(row: CatalogRow) -> Result<Self, Self::Error> {
        let category: BossCategory = row.category.parse()?;
        Ok(CatalogEntry {
            boss_id: row.boss_id,
            scope: row.scope,
            respawn_timer_ms: row.timer_ms,
            window_hours: row.window_hours,
            category,
            added_by: row.added_by,
            created_at: row.created_at,
        })
    }
}
