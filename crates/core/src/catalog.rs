//! Boss catalog and death record types.
//!
//! A [`CatalogEntry`] describes a trackable boss (timer, window, category)
//! within a catalog scope. A [`DeathRecord`] is the latest reported death of
//! that boss in one community.

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{CommunityId, Timestamp};
use crate::window::RespawnWindow;

/// Scope key used for the shared catalog when it is not partitioned per community.
pub const GLOBAL_SCOPE: &str = "global";

/// Attribution for entries inserted by the startup seeder.
pub const SEED_AUTHOR: &str = "system";

const MS_PER_HOUR: i64 = 60 * 60 * 1000;

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

/// Grouping used by the summary listings. Not part of the window math.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BossCategory {
    #[default]
    Regular,
    Epic,
    Subclass,
}

impl BossCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            BossCategory::Regular => "regular",
            BossCategory::Epic => "epic",
            BossCategory::Subclass => "subclass",
        }
    }
}

impl fmt::Display for BossCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BossCategory {
    type Err = CoreError;

    /// Accepts the canonical names plus the short command aliases.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "regular" | "rb" => Ok(BossCategory::Regular),
            "epic" => Ok(BossCategory::Epic),
            "subclass" | "sub" => Ok(BossCategory::Subclass),
            other => Err(CoreError::Validation(format!(
                "Unknown category '{other}'. Use one of: regular, epic, subclass"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Scope
// ---------------------------------------------------------------------------

/// How catalog entries are partitioned across communities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CatalogScope {
    /// One catalog shared by every community.
    #[default]
    Global,
    /// Each community maintains its own catalog.
    Community,
}

impl CatalogScope {
    /// The catalog scope key to use for a message from `community_id`.
    pub fn resolve(&self, community_id: &str) -> String {
        match self {
            CatalogScope::Global => GLOBAL_SCOPE.to_string(),
            CatalogScope::Community => community_id.to_string(),
        }
    }
}

impl FromStr for CatalogScope {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "global" => Ok(CatalogScope::Global),
            "community" => Ok(CatalogScope::Community),
            other => Err(CoreError::Validation(format!(
                "Unknown catalog scope '{other}'. Use 'global' or 'community'"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

/// A trackable boss.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    pub boss_id: String,
    pub scope: String,
    pub respawn_timer_ms: i64,
    pub window_hours: i32,
    pub category: BossCategory,
    pub added_by: String,
    pub created_at: Timestamp,
}

impl CatalogEntry {
    pub fn respawn_timer(&self) -> Duration {
        Duration::milliseconds(self.respawn_timer_ms)
    }

    pub fn window_length(&self) -> Duration {
        Duration::hours(i64::from(self.window_hours))
    }

    /// Window bounds for a death at `death_time`.
    pub fn window_for(&self, death_time: Timestamp) -> Result<RespawnWindow, CoreError> {
        RespawnWindow::new(death_time, self.respawn_timer(), self.window_length())
    }
}

/// Input for adding a catalog entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCatalogEntry {
    pub boss_id: String,
    pub scope: String,
    pub timer_hours: u32,
    pub window_hours: u32,
    pub category: BossCategory,
    pub added_by: String,
}

impl NewCatalogEntry {
    pub fn respawn_timer_ms(&self) -> i64 {
        i64::from(self.timer_hours) * MS_PER_HOUR
    }

    /// Window length as the signed column type the stores keep.
    pub fn stored_window_hours(&self) -> Result<i32, CoreError> {
        i32::try_from(self.window_hours).map_err(|_| {
            CoreError::Validation(format!(
                "Window length of {} hours is too large",
                self.window_hours
            ))
        })
    }

    /// Materialize the entry as the store would persist it.
    pub fn into_entry(self, created_at: Timestamp) -> Result<CatalogEntry, CoreError> {
        Ok(CatalogEntry {
            respawn_timer_ms: self.respawn_timer_ms(),
            window_hours: self.stored_window_hours()?,
            boss_id: self.boss_id,
            scope: self.scope,
            category: self.category,
            added_by: self.added_by,
            created_at,
        })
    }
}

/// The latest known death of a boss in one community.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeathRecord {
    pub boss_id: String,
    pub community_id: CommunityId,
    pub death_time: Timestamp,
    pub reported_by: String,
    pub updated_at: Timestamp,
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Accepted ranges for catalog timing parameters, in hours.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationBounds {
    pub timer_hours: RangeInclusive<u32>,
    pub window_hours: RangeInclusive<u32>,
}

impl Default for ValidationBounds {
    fn default() -> Self {
        Self {
            timer_hours: 1..=999,
            window_hours: 1..=9,
        }
    }
}

impl ValidationBounds {
    /// Reject bound sets that would admit entries the engine or the
    /// database cannot hold: a zero minimum, an inverted range, or a window
    /// longer than the signed column allows.
    pub fn check_consistent(&self) -> Result<(), CoreError> {
        for (range, name) in [
            (&self.timer_hours, "timer"),
            (&self.window_hours, "window"),
        ] {
            if *range.start() == 0 {
                return Err(CoreError::Validation(format!(
                    "Minimum {name} hours must be at least 1"
                )));
            }
            if range.start() > range.end() {
                return Err(CoreError::Validation(format!(
                    "Minimum {name} hours ({}) exceeds the maximum ({})",
                    range.start(),
                    range.end()
                )));
            }
        }
        if i32::try_from(*self.window_hours.end()).is_err() {
            return Err(CoreError::Validation(format!(
                "Maximum window hours must not exceed {}",
                i32::MAX
            )));
        }
        Ok(())
    }

    /// Check a new entry's name, timer and window against these bounds.
    pub fn validate(&self, entry: &NewCatalogEntry) -> Result<(), CoreError> {
        if entry.boss_id.is_empty() {
            return Err(CoreError::Validation("Boss name must not be empty".into()));
        }
        validate_hours(entry.timer_hours, &self.timer_hours, "Respawn timer")?;
        validate_hours(entry.window_hours, &self.window_hours, "Window length")?;
        Ok(())
    }
}

fn validate_hours(value: u32, range: &RangeInclusive<u32>, name: &str) -> Result<(), CoreError> {
    if !range.contains(&value) {
        return Err(CoreError::Validation(format!(
            "{name} must be between {} and {} hours, got {value}",
            range.start(),
            range.end()
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Names
// ---------------------------------------------------------------------------

/// Normalize a user-supplied boss name into a catalog key.
pub fn normalize_boss_name(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Uppercase the first character for display (`"qa"` -> `"Qa"`).
pub fn display_name(boss_id: &str) -> String {
    let mut chars = boss_id.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// ---------------------------------------------------------------------------
// Built-in catalog
// ---------------------------------------------------------------------------

/// Bosses seeded on startup: `(name, timer hours, window hours, category)`.
pub const DEFAULT_CATALOG: &[(&str, u32, u32, BossCategory)] = &[
    ("qa", 24, 4, BossCategory::Epic),
    ("core", 48, 4, BossCategory::Epic),
    ("orfen", 33, 4, BossCategory::Epic),
    ("zaken", 45, 4, BossCategory::Epic),
    ("baium", 125, 4, BossCategory::Epic),
    ("antharas", 192, 4, BossCategory::Epic),
    ("valakas", 264, 4, BossCategory::Epic),
    ("cabrio", 12, 9, BossCategory::Subclass),
    ("hallate", 12, 9, BossCategory::Subclass),
    ("kernon", 12, 9, BossCategory::Subclass),
    ("golkonda", 12, 9, BossCategory::Subclass),
    ("barakiel", 12, 9, BossCategory::Regular),
];

/// The built-in catalog as insertable entries for `scope`.
pub fn default_entries(scope: &str) -> Vec<NewCatalogEntry> {
    DEFAULT_CATALOG
        .iter()
        .map(|&(name, timer_hours, window_hours, category)| NewCatalogEntry {
            boss_id: name.to_string(),
            scope: scope.to_string(),
            timer_hours,
            window_hours,
            category,
            added_by: SEED_AUTHOR.to_string(),
        })
        .collect()
}
