//! Reply text for chat responses.
//!
//! All user-visible wording lives here so the interpreter only decides
//! *which* reply to send.

use std::fmt::Write;

use crate::catalog::{display_name, BossCategory, CatalogEntry, DeathRecord};
use crate::error::CoreError;
use crate::store::{DueEntry, RemovalOutcome};
use crate::time::TimeFormat;
use crate::window::{RespawnWindow, WindowState};

pub fn recorded(record: &DeathRecord, window: &RespawnWindow, fmt: TimeFormat) -> String {
    format!(
        "{} marked as dead at {}, respawn window will start at {}.",
        display_name(&record.boss_id),
        fmt.render(record.death_time),
        fmt.render(window.start),
    )
}

pub fn updated(record: &DeathRecord, window: &RespawnWindow, fmt: TimeFormat) -> String {
    format!(
        "{} updated: death time set to {}, respawn starts at {}.",
        display_name(&record.boss_id),
        fmt.render(record.death_time),
        fmt.render(window.start),
    )
}

pub fn no_record(boss_id: &str) -> String {
    format!(
        "No death record found for {} on this server.",
        display_name(boss_id)
    )
}

/// Status line for a single boss query.
pub fn window_status(record: &DeathRecord, state: &WindowState, fmt: TimeFormat) -> String {
    let boss = display_name(&record.boss_id);
    let by = &record.reported_by;
    match state {
        WindowState::Pending {
            window_start,
            window_length,
        } => format!(
            "{boss} window starts at {} and will last for {} hours. Last updated by {by}.",
            fmt.render(*window_start),
            window_length.num_hours(),
        ),
        WindowState::Open { remaining, .. } => format!(
            "**{boss} is currently within its spawn window!**\nRemaining time: {remaining}.\nLast updated by {by}."
        ),
        WindowState::Expired { window_end } => format!(
            "{boss} window ended at {}. Last updated by {by}.",
            fmt.render(*window_end),
        ),
    }
}

/// Summary of non-expired bosses in one category.
pub fn due_list(category: BossCategory, due: &[DueEntry], fmt: TimeFormat) -> String {
    if due.is_empty() {
        return format!("No {category} bosses are being tracked right now on this server.");
    }

    let mut out = format!(
        "**{} boss respawn times:**\n\n",
        display_name(category.as_str())
    );
    for item in due {
        let boss = display_name(&item.entry.boss_id);
        let status = match &item.state {
            WindowState::Pending { window_start, .. } => format!(
                "window opens at {} ({}h window)",
                fmt.render(*window_start),
                item.entry.window_hours,
            ),
            WindowState::Open { remaining, window_end } => format!(
                "in window, {remaining} left (ends {})",
                fmt.render(*window_end),
            ),
            // Filtered out by `select_due`.
            WindowState::Expired { .. } => continue,
        };
        let _ = writeln!(
            out,
            "• **{boss}** - {status}. Updated by {}",
            item.record.reported_by
        );
    }
    out
}

pub fn added(entry: &CatalogEntry) -> String {
    format!(
        "{} added to the catalog ({}, respawn after {}h, {}h window).",
        display_name(&entry.boss_id),
        entry.category,
        entry.respawn_timer().num_hours(),
        entry.window_hours,
    )
}

pub fn removed(boss_id: &str, outcome: RemovalOutcome) -> String {
    let mut out = format!("{} removed from the catalog.", display_name(boss_id));
    match outcome.orphaned_records {
        0 => {}
        1 => out.push_str(" 1 death record no longer matches a catalog entry."),
        n => {
            let _ = write!(out, " {n} death records no longer match a catalog entry.");
        }
    }
    out
}

pub fn catalog_list(entries: &[CatalogEntry]) -> String {
    if entries.is_empty() {
        return "The boss catalog is empty.".to_string();
    }

    let mut out = String::from("**Tracked bosses:**\n");
    for entry in entries {
        let _ = writeln!(
            out,
            "• **{}** - {}h window ({})",
            display_name(&entry.boss_id),
            entry.window_hours,
            entry.category,
        );
    }
    out
}

pub fn help(prefix: &str) -> String {
    format!(
        "**Boss timer commands**\n\
         `{p}dead <boss>` - record a kill right now\n\
         `{p}update <boss> <YYYY-MM-DD> <HH:MM>` - correct the time of death (UTC)\n\
         `{p}<boss>` - show the respawn window\n\
         `{p}rb` / `{p}epic` / `{p}sub` - bosses that have not expired, by category\n\
         `{p}rbadd <boss> [regular|epic|subclass] <timerHours> <windowHours>` - add a boss\n\
         `{p}rbremove <boss>` - remove a boss (admins only)\n\
         `{p}list` - every boss in the catalog\n\
         `{p}help` - this message",
        p = prefix
    )
}

/// User-facing text for a failed command.
pub fn error(err: &CoreError, prefix: &str) -> String {
    match err {
        CoreError::NotFound { name, .. } => format!(
            "Unknown boss '{name}'. Use `{prefix}list` to see valid names."
        ),
        CoreError::Validation(msg)
        | CoreError::InvalidTimestamp(msg)
        | CoreError::Duplicate(msg)
        | CoreError::Permission(msg) => msg.clone(),
        CoreError::StoreUnavailable(msg) => format!(
            "The boss database is unavailable right now ({msg}). Nothing was recorded."
        ),
    }
}
