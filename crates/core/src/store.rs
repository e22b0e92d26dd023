//! Storage contract for the boss catalog and death records.
//!
//! The interpreter talks to storage only through [`BossStore`], so the
//! PostgreSQL backend (in the `db` crate) and [`MemoryBossStore`] are
//! interchangeable and chosen by configuration.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::catalog::{BossCategory, CatalogEntry, DeathRecord, NewCatalogEntry};
use crate::error::CoreError;
use crate::types::Timestamp;
use crate::window::{RespawnWindow, WindowState};

/// Result of removing a catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemovalOutcome {
    /// Death records that still reference the removed boss.
    pub orphaned_records: u64,
}

/// A tracked boss whose window has not expired yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DueEntry {
    pub record: DeathRecord,
    pub entry: CatalogEntry,
    pub window: RespawnWindow,
    pub state: WindowState,
}

/// Catalog and death-record persistence.
///
/// Implementations must make [`BossStore::upsert_death`] atomic on the
/// `(boss_id, community_id)` key: concurrent writers never merge, the last
/// one wins.
#[async_trait]
pub trait BossStore: Send + Sync {
    // --- Catalog ---

    async fn lookup(&self, boss_id: &str, scope: &str) -> Result<Option<CatalogEntry>, CoreError>;

    /// Insert a catalog entry. Fails with [`CoreError::Duplicate`] if the
    /// name already exists in the scope.
    async fn add(&self, entry: NewCatalogEntry) -> Result<CatalogEntry, CoreError>;

    /// Delete a catalog entry. Death records are left in place.
    async fn remove(&self, boss_id: &str, scope: &str) -> Result<RemovalOutcome, CoreError>;

    /// Catalog entries in `scope`, ordered by name (case-insensitive).
    async fn list(
        &self,
        scope: &str,
        category: Option<BossCategory>,
    ) -> Result<Vec<CatalogEntry>, CoreError>;

    // --- Death records ---

    async fn upsert_death(
        &self,
        boss_id: &str,
        community_id: &str,
        death_time: Timestamp,
        reported_by: &str,
        now: Timestamp,
    ) -> Result<DeathRecord, CoreError>;

    async fn get_death(
        &self,
        boss_id: &str,
        community_id: &str,
    ) -> Result<Option<DeathRecord>, CoreError>;

    /// Death records in `community_id` joined with their catalog entries in
    /// `scope`. Orphaned records are omitted.
    async fn list_tracked(
        &self,
        community_id: &str,
        scope: &str,
        category: Option<BossCategory>,
    ) -> Result<Vec<(DeathRecord, CatalogEntry)>, CoreError>;

    /// Verify the backend is reachable.
    async fn health_check(&self) -> Result<(), CoreError>;

    /// Tracked bosses that are not expired at `now`, soonest window end first.
    async fn list_due(
        &self,
        community_id: &str,
        scope: &str,
        category: Option<BossCategory>,
        now: Timestamp,
    ) -> Result<Vec<DueEntry>, CoreError> {
        let tracked = self.list_tracked(community_id, scope, category).await?;
        Ok(select_due(tracked, now))
    }
}

/// Keep non-expired entries and order them by window end, then name.
pub fn select_due(tracked: Vec<(DeathRecord, CatalogEntry)>, now: Timestamp) -> Vec<DueEntry> {
    let mut due: Vec<DueEntry> = tracked
        .into_iter()
        .filter_map(|(record, entry)| {
            let window = match entry.window_for(record.death_time) {
                Ok(window) => window,
                Err(err) => {
                    tracing::warn!(
                        boss = %record.boss_id,
                        community = %record.community_id,
                        error = %err,
                        "Skipping death record with an unrepresentable window"
                    );
                    return None;
                }
            };
            let state = window.state_at(now);
            (!state.is_expired()).then_some(DueEntry {
                record,
                entry,
                window,
                state,
            })
        })
        .collect();

    due.sort_by(|a, b| {
        a.state
            .sort_key()
            .cmp(&b.state.sort_key())
            .then_with(|| a.entry.boss_id.cmp(&b.entry.boss_id))
    });
    due
}

/// Insert the built-in catalog into `scope`, skipping names that already exist.
///
/// Returns how many entries were inserted.
pub async fn seed_default_catalog(store: &dyn BossStore, scope: &str) -> Result<usize, CoreError> {
    let mut inserted = 0;
    for entry in crate::catalog::default_entries(scope) {
        match store.add(entry).await {
            Ok(_) => inserted += 1,
            Err(CoreError::Duplicate(_)) => {}
            Err(err) => return Err(err),
        }
    }
    tracing::debug!(scope, inserted, "Seeded default boss catalog");
    Ok(inserted)
}

// ---------------------------------------------------------------------------
// In-memory backend
// ---------------------------------------------------------------------------

#[derive(Default)]
struct MemoryTables {
    /// (scope, boss_id) -> entry
    catalog: HashMap<(String, String), CatalogEntry>,
    /// (boss_id, community_id) -> record
    deaths: HashMap<(String, String), DeathRecord>,
}

/// Process-local store. Each mutation happens inside a single write-lock
/// section, which makes upserts atomic.
#[derive(Default)]
pub struct MemoryBossStore {
    tables: RwLock<MemoryTables>,
}

impl MemoryBossStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BossStore for MemoryBossStore {
    async fn lookup(&self, boss_id: &str, scope: &str) -> Result<Option<CatalogEntry>, CoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .catalog
            .get(&(scope.to_string(), boss_id.to_string()))
            .cloned())
    }

    async fn add(&self, entry: NewCatalogEntry) -> Result<CatalogEntry, CoreError> {
        let mut tables = self.tables.write().await;
        let key = (entry.scope.clone(), entry.boss_id.clone());
        if tables.catalog.contains_key(&key) {
            return Err(CoreError::Duplicate(format!(
                "'{}' is already in the catalog",
                entry.boss_id
            )));
        }
        let stored = entry.into_entry(chrono::Utc::now())?;
        tables.catalog.insert(key, stored.clone());
        Ok(stored)
    }

    async fn remove(&self, boss_id: &str, scope: &str) -> Result<RemovalOutcome, CoreError> {
        let mut tables = self.tables.write().await;
        let removed = tables
            .catalog
            .remove(&(scope.to_string(), boss_id.to_string()));
        let Some(removed) = removed else {
            return Err(CoreError::boss_not_found(boss_id));
        };

        let orphaned_records = tables
            .deaths
            .values()
            .filter(|r| r.boss_id == removed.boss_id)
            .filter(|r| scope == crate::catalog::GLOBAL_SCOPE || r.community_id == scope)
            .count() as u64;

        Ok(RemovalOutcome { orphaned_records })
    }

    async fn list(
        &self,
        scope: &str,
        category: Option<BossCategory>,
    ) -> Result<Vec<CatalogEntry>, CoreError> {
        let tables = self.tables.read().await;
        let mut entries: Vec<CatalogEntry> = tables
            .catalog
            .values()
            .filter(|e| e.scope == scope)
            .filter(|e| category.map_or(true, |c| e.category == c))
            .cloned()
            .collect();
        entries.sort_by_key(|e| e.boss_id.to_lowercase());
        Ok(entries)
    }

    async fn upsert_death(
        &self,
        boss_id: &str,
        community_id: &str,
        death_time: Timestamp,
        reported_by: &str,
        now: Timestamp,
    ) -> Result<DeathRecord, CoreError> {
        let record = DeathRecord {
            boss_id: boss_id.to_string(),
            community_id: community_id.to_string(),
            death_time,
            reported_by: reported_by.to_string(),
            updated_at: now,
        };
        let mut tables = self.tables.write().await;
        tables.deaths.insert(
            (boss_id.to_string(), community_id.to_string()),
            record.clone(),
        );
        Ok(record)
    }

    async fn get_death(
        &self,
        boss_id: &str,
        community_id: &str,
    ) -> Result<Option<DeathRecord>, CoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .deaths
            .get(&(boss_id.to_string(), community_id.to_string()))
            .cloned())
    }

    async fn list_tracked(
        &self,
        community_id: &str,
        scope: &str,
        category: Option<BossCategory>,
    ) -> Result<Vec<(DeathRecord, CatalogEntry)>, CoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .deaths
            .values()
            .filter(|r| r.community_id == community_id)
            .filter_map(|r| {
                tables
                    .catalog
                    .get(&(scope.to_string(), r.boss_id.clone()))
                    .filter(|e| category.map_or(true, |c| e.category == c))
                    .map(|e| (r.clone(), e.clone()))
            })
            .collect())
    }

    async fn health_check(&self) -> Result<(), CoreError> {
        Ok(())
    }
}
