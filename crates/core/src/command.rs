//! Chat command parsing.
//!
//! Turns raw message text into a [`Command`]. Parsing is independent of the
//! store and the window engine so it can be tested on its own.

use crate::catalog::{normalize_boss_name, BossCategory};
use crate::error::CoreError;
use crate::time::parse_utc_timestamp;
use crate::types::Timestamp;

/// Every command the bot understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `dead <boss>`: the boss died just now.
    RecordDeath { boss: String },
    /// `update <boss> <date> <time>`: correct the death time.
    UpdateDeath { boss: String, death_time: Timestamp },
    /// `<boss>`: show the current window state.
    Query { boss: String },
    /// `rb` / `epic` / `sub`: summary of bosses that have not expired.
    ListCategory { category: BossCategory },
    /// `rbadd <boss> [category] <timerHours> <windowHours>`.
    AddBoss {
        boss: String,
        category: BossCategory,
        timer_hours: u32,
        window_hours: u32,
    },
    /// `rbremove <boss>` (admin only).
    RemoveBoss { boss: String },
    /// `list`: every catalog entry.
    ListAll,
    /// `help`: usage text.
    Help,
}

impl Command {
    /// Short name used in logs.
    pub fn verb(&self) -> &'static str {
        match self {
            Command::RecordDeath { .. } => "dead",
            Command::UpdateDeath { .. } => "update",
            Command::Query { .. } => "query",
            Command::ListCategory { .. } => "list_category",
            Command::AddBoss { .. } => "rbadd",
            Command::RemoveBoss { .. } => "rbremove",
            Command::ListAll => "list",
            Command::Help => "help",
        }
    }
}

/// Parse a chat message.
///
/// Returns `Ok(None)` when the message is not addressed to the bot (missing
/// prefix or nothing after it), and `Err` when it is a malformed command.
pub fn parse(content: &str, prefix: &str) -> Result<Option<Command>, CoreError> {
    let Some(rest) = content.trim().strip_prefix(prefix) else {
        return Ok(None);
    };

    let mut tokens = rest.split_whitespace();
    let Some(verb) = tokens.next() else {
        return Ok(None);
    };
    let verb = verb.to_lowercase();
    let args: Vec<&str> = tokens.collect();

    let command = match verb.as_str() {
        "dead" => Command::RecordDeath {
            boss: boss_arg(&args, prefix, "dead <boss>")?,
        },
        "update" => {
            let boss = boss_arg(&args, prefix, "update <boss> <YYYY-MM-DD> <HH:MM>")?;
            let death_time = parse_utc_timestamp(&args[1..].join(" "))?;
            Command::UpdateDeath { boss, death_time }
        }
        "rb" => Command::ListCategory {
            category: BossCategory::Regular,
        },
        "epic" => Command::ListCategory {
            category: BossCategory::Epic,
        },
        "sub" => Command::ListCategory {
            category: BossCategory::Subclass,
        },
        "rbadd" => parse_add(&args, prefix)?,
        "rbremove" => Command::RemoveBoss {
            boss: boss_arg(&args, prefix, "rbremove <boss>")?,
        },
        "list" => Command::ListAll,
        "help" => Command::Help,
        _ => Command::Query {
            boss: normalize_boss_name(&verb),
        },
    };

    Ok(Some(command))
}

/// Verbs with their own command. A boss with one of these names could be
/// added but never queried, so `rbadd` refuses them.
pub const RESERVED_VERBS: &[&str] = &[
    "dead", "update", "rb", "epic", "sub", "rbadd", "rbremove", "list", "help",
];

fn usage(prefix: &str, form: &str) -> CoreError {
    CoreError::Validation(format!("Usage: {prefix}{form}"))
}

fn boss_arg(args: &[&str], prefix: &str, form: &str) -> Result<String, CoreError> {
    args.first()
        .map(|raw| normalize_boss_name(raw))
        .ok_or_else(|| usage(prefix, form))
}

fn parse_add(args: &[&str], prefix: &str) -> Result<Command, CoreError> {
    const FORM: &str = "rbadd <boss> [regular|epic|subclass] <timerHours> <windowHours>";

    let (boss, category, timer, window) = match args {
        [boss, timer, window] => (boss, BossCategory::Regular, timer, window),
        [boss, category, timer, window] => (boss, category.parse()?, timer, window),
        _ => return Err(usage(prefix, FORM)),
    };

    let boss = normalize_boss_name(boss);
    if RESERVED_VERBS.contains(&boss.as_str()) {
        return Err(CoreError::Validation(format!(
            "'{boss}' is a command name and cannot be used as a boss name"
        )));
    }

    Ok(Command::AddBoss {
        boss,
        category,
        timer_hours: parse_hours(timer, "Respawn timer")?,
        window_hours: parse_hours(window, "Window length")?,
    })
}

fn parse_hours(raw: &str, name: &str) -> Result<u32, CoreError> {
    raw.parse().map_err(|_| {
        CoreError::Validation(format!(
            "{name} must be a whole number of hours, got '{raw}'"
        ))
    })
}
