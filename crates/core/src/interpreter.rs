//! Command interpreter: message text in, reply text out.
//!
//! Parses a message into a [`Command`], runs it against a [`BossStore`] and
//! the window engine, and renders the reply. Every failure is turned into a
//! reply here; nothing escapes to the chat adapter.

use std::sync::Arc;

use serde::Deserialize;

use crate::catalog::{CatalogEntry, CatalogScope, NewCatalogEntry, ValidationBounds};
use crate::command::{self, Command};
use crate::error::CoreError;
use crate::reply;
use crate::store::BossStore;
use crate::time::TimeFormat;
use crate::types::{CommunityId, Timestamp};

/// A chat message as delivered by the chat adapter.
#[derive(Debug, Clone, Deserialize)]
pub struct IncomingMessage {
    pub community_id: CommunityId,
    pub author: String,
    /// Whether the author holds the platform's admin capability.
    #[serde(default)]
    pub is_admin: bool,
    pub content: String,
}

/// Behaviour knobs for the interpreter.
#[derive(Debug, Clone)]
pub struct InterpreterConfig {
    pub prefix: String,
    pub catalog_scope: CatalogScope,
    pub time_format: TimeFormat,
    pub bounds: ValidationBounds,
    /// Require the admin capability for `rbadd` as well as `rbremove`.
    pub admin_only_add: bool,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            prefix: "!".to_string(),
            catalog_scope: CatalogScope::default(),
            time_format: TimeFormat::default(),
            bounds: ValidationBounds::default(),
            admin_only_add: false,
        }
    }
}

#[derive(Clone)]
pub struct Interpreter {
    store: Arc<dyn BossStore>,
    config: InterpreterConfig,
}

impl Interpreter {
    pub fn new(store: Arc<dyn BossStore>, config: InterpreterConfig) -> Self {
        Self { store, config }
    }

    /// Handle one message. Returns `None` when the message is not a command.
    pub async fn handle(&self, msg: &IncomingMessage, now: Timestamp) -> Option<String> {
        let command = match command::parse(&msg.content, &self.config.prefix) {
            Ok(Some(command)) => command,
            Ok(None) => return None,
            Err(err) => {
                tracing::debug!(community = %msg.community_id, error = %err, "Rejected malformed command");
                return Some(reply::error(&err, &self.config.prefix));
            }
        };

        let verb = command.verb();
        tracing::info!(
            community = %msg.community_id,
            author = %msg.author,
            verb,
            "Handling command"
        );

        match self.execute(command, msg, now).await {
            Ok(text) => Some(text),
            Err(err) => {
                match &err {
                    CoreError::StoreUnavailable(_) => {
                        tracing::error!(community = %msg.community_id, verb, error = %err, "Store failure");
                    }
                    _ => {
                        tracing::debug!(community = %msg.community_id, verb, error = %err, "Command failed");
                    }
                }
                Some(reply::error(&err, &self.config.prefix))
            }
        }
    }

    /// Run a parsed command. Errors are returned for the caller to render.
    pub async fn execute(
        &self,
        command: Command,
        msg: &IncomingMessage,
        now: Timestamp,
    ) -> Result<String, CoreError> {
        let scope = self.config.catalog_scope.resolve(&msg.community_id);
        let fmt = self.config.time_format;

        match command {
            Command::RecordDeath { boss } => {
                let entry = self.require_entry(&boss, &scope).await?;
                let window = entry.window_for(now)?;
                let record = self
                    .store
                    .upsert_death(&boss, &msg.community_id, now, &msg.author, now)
                    .await?;
                Ok(reply::recorded(&record, &window, fmt))
            }
            Command::UpdateDeath { boss, death_time } => {
                let entry = self.require_entry(&boss, &scope).await?;
                // Checked before the write so an unrepresentable window is never stored.
                let window = entry.window_for(death_time)?;
                let record = self
                    .store
                    .upsert_death(&boss, &msg.community_id, death_time, &msg.author, now)
                    .await?;
                Ok(reply::updated(&record, &window, fmt))
            }
            Command::Query { boss } => {
                let entry = self.require_entry(&boss, &scope).await?;
                let Some(record) = self.store.get_death(&boss, &msg.community_id).await? else {
                    return Ok(reply::no_record(&boss));
                };
                let state = entry.window_for(record.death_time)?.state_at(now);
                Ok(reply::window_status(&record, &state, fmt))
            }
            Command::ListCategory { category } => {
                let due = self
                    .store
                    .list_due(&msg.community_id, &scope, Some(category), now)
                    .await?;
                Ok(reply::due_list(category, &due, fmt))
            }
            Command::AddBoss {
                boss,
                category,
                timer_hours,
                window_hours,
            } => {
                if self.config.admin_only_add && !msg.is_admin {
                    return Err(CoreError::Permission(
                        "Only server admins can add bosses.".into(),
                    ));
                }
                let new_entry = NewCatalogEntry {
                    boss_id: boss,
                    scope,
                    timer_hours,
                    window_hours,
                    category,
                    added_by: msg.author.clone(),
                };
                self.config.bounds.validate(&new_entry)?;
                let entry = self.store.add(new_entry).await?;
                tracing::info!(boss = %entry.boss_id, scope = %entry.scope, "Catalog entry added");
                Ok(reply::added(&entry))
            }
            Command::RemoveBoss { boss } => {
                if !msg.is_admin {
                    return Err(CoreError::Permission(
                        "Only server admins can remove bosses.".into(),
                    ));
                }
                let outcome = self.store.remove(&boss, &scope).await?;
                tracing::info!(
                    boss = %boss,
                    scope = %scope,
                    orphaned = outcome.orphaned_records,
                    "Catalog entry removed"
                );
                Ok(reply::removed(&boss, outcome))
            }
            Command::ListAll => {
                let entries = self.store.list(&scope, None).await?;
                Ok(reply::catalog_list(&entries))
            }
            Command::Help => Ok(reply::help(&self.config.prefix)),
        }
    }

    async fn require_entry(&self, boss: &str, scope: &str) -> Result<CatalogEntry, CoreError> {
        self.store
            .lookup(boss, scope)
            .await?
            .ok_or_else(|| CoreError::boss_not_found(boss))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{default_entries, BossCategory, DeathRecord, GLOBAL_SCOPE};
    use crate::store::{seed_default_catalog, MemoryBossStore, RemovalOutcome};
    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use chrono::{Duration, TimeZone, Utc};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Store whose backend is down. Catalog lookups can optionally still
    /// succeed so the failure lands on the write.
    struct UnavailableStore {
        lookups_succeed: bool,
        writes: AtomicUsize,
    }

    impl UnavailableStore {
        fn new(lookups_succeed: bool) -> Self {
            Self {
                lookups_succeed,
                writes: AtomicUsize::new(0),
            }
        }

        fn down() -> CoreError {
            CoreError::StoreUnavailable("connection refused".into())
        }
    }

    #[async_trait]
    impl BossStore for UnavailableStore {
        async fn lookup(&self, boss_id: &str, scope: &str) -> Result<Option<CatalogEntry>, CoreError> {
            if !self.lookups_succeed {
                return Err(Self::down());
            }
            default_entries(scope)
                .into_iter()
                .find(|e| e.boss_id == boss_id)
                .map(|e| e.into_entry(Utc::now()))
                .transpose()
        }

        async fn add(&self, _entry: NewCatalogEntry) -> Result<CatalogEntry, CoreError> {
            Err(Self::down())
        }

        async fn remove(&self, _boss_id: &str, _scope: &str) -> Result<RemovalOutcome, CoreError> {
            Err(Self::down())
        }

        async fn list(
            &self,
            _scope: &str,
            _category: Option<BossCategory>,
        ) -> Result<Vec<CatalogEntry>, CoreError> {
            Err(Self::down())
        }

        async fn upsert_death(
            &self,
            _boss_id: &str,
            _community_id: &str,
            _death_time: Timestamp,
            _reported_by: &str,
            _now: Timestamp,
        ) -> Result<DeathRecord, CoreError> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            Err(Self::down())
        }

        async fn get_death(
            &self,
            _boss_id: &str,
            _community_id: &str,
        ) -> Result<Option<DeathRecord>, CoreError> {
            Err(Self::down())
        }

        async fn list_tracked(
            &self,
            _community_id: &str,
            _scope: &str,
            _category: Option<BossCategory>,
        ) -> Result<Vec<(DeathRecord, CatalogEntry)>, CoreError> {
            Err(Self::down())
        }

        async fn health_check(&self) -> Result<(), CoreError> {
            Err(Self::down())
        }
    }

    const DOWN_REPLY: &str =
        "The boss database is unavailable right now (connection refused). Nothing was recorded.";

    fn config() -> InterpreterConfig {
        InterpreterConfig {
            time_format: TimeFormat::Utc,
            ..InterpreterConfig::default()
        }
    }

    async fn seeded(config: InterpreterConfig) -> (Interpreter, Arc<MemoryBossStore>) {
        let store = Arc::new(MemoryBossStore::new());
        seed_default_catalog(store.as_ref(), GLOBAL_SCOPE).await.unwrap();
        (Interpreter::new(store.clone(), config), store)
    }

    fn msg(content: &str) -> IncomingMessage {
        IncomingMessage {
            community_id: "guild-1".into(),
            author: "alice".into(),
            is_admin: false,
            content: content.into(),
        }
    }

    fn admin(content: &str) -> IncomingMessage {
        IncomingMessage {
            is_admin: true,
            ..msg(content)
        }
    }

    fn t(d: u32, h: u32, m: u32, s: u32) -> Timestamp {
        Utc.with_ymd_and_hms(2025, 1, d, h, m, s).unwrap()
    }

    #[tokio::test]
    async fn non_commands_get_no_reply() {
        let (bot, _) = seeded(config()).await;
        assert_eq!(bot.handle(&msg("gg everyone"), t(1, 0, 0, 0)).await, None);
    }

    #[tokio::test]
    async fn dead_records_now_and_reports_window_start() {
        let (bot, store) = seeded(config()).await;
        let reply = bot.handle(&msg("!dead QA"), t(1, 0, 0, 0)).await.unwrap();
        assert_eq!(
            reply,
            "Qa marked as dead at 2025-01-01 00:00 UTC, respawn window will start at 2025-01-02 00:00 UTC."
        );

        let record = store.get_death("qa", "guild-1").await.unwrap().unwrap();
        assert_eq!(record.death_time, t(1, 0, 0, 0));
        assert_eq!(record.reported_by, "alice");
    }

    #[tokio::test]
    async fn dead_unknown_boss_is_not_found() {
        let (bot, store) = seeded(config()).await;
        let reply = bot.handle(&msg("!dead nobody"), t(1, 0, 0, 0)).await.unwrap();
        assert!(reply.starts_with("Unknown boss 'nobody'"));
        assert!(store.get_death("nobody", "guild-1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn query_walks_through_window_states() {
        let (bot, _) = seeded(config()).await;
        bot.handle(&msg("!update qa 2025-01-01 00:00"), t(1, 0, 0, 0))
            .await
            .unwrap();

        let pending = bot.handle(&msg("!qa"), t(1, 23, 0, 0)).await.unwrap();
        assert!(pending.contains("window starts at 2025-01-02 00:00 UTC"), "{pending}");

        let open = bot.handle(&msg("!qa"), t(2, 2, 0, 0)).await.unwrap();
        assert!(open.contains("Remaining time: 2h 0m."), "{open}");

        let expired = bot.handle(&msg("!qa"), t(2, 4, 0, 1)).await.unwrap();
        assert!(expired.contains("window ended"), "{expired}");
    }

    #[tokio::test]
    async fn query_without_record() {
        let (bot, _) = seeded(config()).await;
        let reply = bot.handle(&msg("!zaken"), t(1, 0, 0, 0)).await.unwrap();
        assert_eq!(reply, "No death record found for Zaken on this server.");
    }

    #[tokio::test]
    async fn records_are_isolated_per_community() {
        let (bot, _) = seeded(config()).await;
        bot.handle(&msg("!dead qa"), t(1, 0, 0, 0)).await.unwrap();

        let other = IncomingMessage {
            community_id: "guild-2".into(),
            ..msg("!qa")
        };
        let reply = bot.handle(&other, t(1, 1, 0, 0)).await.unwrap();
        assert!(reply.starts_with("No death record found"));
    }

    #[tokio::test]
    async fn update_with_bad_timestamp_does_not_mutate() {
        let (bot, store) = seeded(config()).await;
        bot.handle(&msg("!dead qa"), t(1, 0, 0, 0)).await.unwrap();

        let reply = bot
            .handle(&msg("!update qa not-a-date"), t(1, 5, 0, 0))
            .await
            .unwrap();
        assert!(reply.contains("not a valid date/time"), "{reply}");

        let record = store.get_death("qa", "guild-1").await.unwrap().unwrap();
        assert_eq!(record.death_time, t(1, 0, 0, 0));
    }

    #[tokio::test]
    async fn update_overwrites_previous_death() {
        let (bot, store) = seeded(config()).await;
        bot.handle(&msg("!dead core"), t(1, 0, 0, 0)).await.unwrap();
        let reply = bot
            .handle(&msg("!update core 2025-01-01 06:30"), t(1, 8, 0, 0))
            .await
            .unwrap();
        assert_eq!(
            reply,
            "Core updated: death time set to 2025-01-01 06:30 UTC, respawn starts at 2025-01-03 06:30 UTC."
        );

        let record = store.get_death("core", "guild-1").await.unwrap().unwrap();
        assert_eq!(record.death_time, t(1, 6, 30, 0));
        assert_eq!(record.updated_at, t(1, 8, 0, 0));
    }

    #[tokio::test]
    async fn rbadd_window_out_of_bounds_is_rejected() {
        let (bot, store) = seeded(config()).await;
        let cmd = Command::AddBoss {
            boss: "frintezza".into(),
            category: BossCategory::Epic,
            timer_hours: 48,
            window_hours: 10,
        };
        let result = bot.execute(cmd, &msg(""), t(1, 0, 0, 0)).await;
        assert_matches!(result, Err(CoreError::Validation(_)));
        assert!(store.lookup("frintezza", GLOBAL_SCOPE).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn rbadd_then_query() {
        let (bot, _) = seeded(config()).await;
        let reply = bot
            .handle(&msg("!rbadd Frintezza epic 48 2"), t(1, 0, 0, 0))
            .await
            .unwrap();
        assert_eq!(
            reply,
            "Frintezza added to the catalog (epic, respawn after 48h, 2h window)."
        );
        let reply = bot.handle(&msg("!frintezza"), t(1, 0, 0, 0)).await.unwrap();
        assert!(reply.starts_with("No death record found for Frintezza"));
    }

    #[tokio::test]
    async fn rbadd_duplicate_is_rejected() {
        let (bot, _) = seeded(config()).await;
        let result = bot
            .execute(
                command::parse("!rbadd qa 24 4", "!").unwrap().unwrap(),
                &msg(""),
                t(1, 0, 0, 0),
            )
            .await;
        assert_matches!(result, Err(CoreError::Duplicate(_)));
    }

    #[tokio::test]
    async fn rbadd_can_require_admin() {
        let (bot, _) = seeded(InterpreterConfig {
            admin_only_add: true,
            ..config()
        })
        .await;
        let cmd = command::parse("!rbadd frintezza 48 2", "!").unwrap().unwrap();
        assert_matches!(
            bot.execute(cmd.clone(), &msg(""), t(1, 0, 0, 0)).await,
            Err(CoreError::Permission(_))
        );
        assert!(bot.execute(cmd, &admin(""), t(1, 0, 0, 0)).await.is_ok());
    }

    #[tokio::test]
    async fn rbremove_requires_admin() {
        let (bot, store) = seeded(config()).await;
        let reply = bot.handle(&msg("!rbremove qa"), t(1, 0, 0, 0)).await.unwrap();
        assert_eq!(reply, "Only server admins can remove bosses.");
        assert!(store.lookup("qa", GLOBAL_SCOPE).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn removed_boss_with_record_resolves_as_not_found() {
        let (bot, _) = seeded(config()).await;
        bot.handle(&msg("!dead qa"), t(1, 0, 0, 0)).await.unwrap();

        let reply = bot.handle(&admin("!rbremove qa"), t(1, 1, 0, 0)).await.unwrap();
        assert_eq!(
            reply,
            "Qa removed from the catalog. 1 death record no longer matches a catalog entry."
        );

        let reply = bot.handle(&msg("!qa"), t(1, 2, 0, 0)).await.unwrap();
        assert!(reply.starts_with("Unknown boss 'qa'"));
    }

    #[tokio::test]
    async fn rbremove_unknown_boss() {
        let (bot, _) = seeded(config()).await;
        let result = bot
            .execute(
                Command::RemoveBoss {
                    boss: "nobody".into(),
                },
                &admin(""),
                t(1, 0, 0, 0),
            )
            .await;
        assert_matches!(result, Err(CoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn category_listing_skips_expired_and_other_categories() {
        let (bot, _) = seeded(config()).await;
        bot.handle(&msg("!update qa 2025-01-01 00:00"), t(1, 0, 0, 0))
            .await
            .unwrap();
        bot.handle(&msg("!update core 2025-01-01 00:00"), t(1, 0, 0, 0))
            .await
            .unwrap();
        bot.handle(&msg("!update cabrio 2025-01-01 00:00"), t(1, 0, 0, 0))
            .await
            .unwrap();

        // qa is open (window 24h..28h), core is pending, cabrio (12h + 9h) expired.
        let reply = bot.handle(&msg("!epic"), t(2, 1, 0, 0)).await.unwrap();
        let qa = reply.find("**Qa**").expect("qa listed");
        let core = reply.find("**Core**").expect("core listed");
        assert!(qa < core, "soonest window end first: {reply}");
        assert!(reply.contains("in window, 3h 0m left"));
        assert!(!reply.contains("Cabrio"));

        let sub = bot.handle(&msg("!sub"), t(2, 1, 0, 0)).await.unwrap();
        assert_eq!(
            sub,
            "No subclass bosses are being tracked right now on this server."
        );
    }

    #[tokio::test]
    async fn list_shows_whole_catalog_sorted() {
        let (bot, _) = seeded(config()).await;
        let reply = bot.handle(&msg("!list"), t(1, 0, 0, 0)).await.unwrap();
        let antharas = reply.find("Antharas").unwrap();
        let zaken = reply.find("Zaken").unwrap();
        assert!(antharas < zaken);
        assert!(reply.contains("• **Cabrio** - 9h window (subclass)"));
    }

    #[tokio::test]
    async fn community_scoped_catalogs_are_independent() {
        let store = Arc::new(MemoryBossStore::new());
        let bot = Interpreter::new(
            store.clone(),
            InterpreterConfig {
                catalog_scope: CatalogScope::Community,
                ..config()
            },
        );
        bot.handle(&msg("!rbadd frintezza 48 2"), t(1, 0, 0, 0))
            .await
            .unwrap();

        assert!(store.lookup("frintezza", "guild-1").await.unwrap().is_some());
        let other = IncomingMessage {
            community_id: "guild-2".into(),
            ..msg("!frintezza")
        };
        let reply = bot.handle(&other, t(1, 0, 0, 0)).await.unwrap();
        assert!(reply.starts_with("Unknown boss"));
    }

    #[tokio::test]
    async fn open_window_remaining_is_floored() {
        let (bot, _) = seeded(config()).await;
        bot.handle(&msg("!update qa 2025-01-01 00:00"), t(1, 0, 0, 0))
            .await
            .unwrap();
        let at = t(2, 0, 0, 0) + Duration::seconds(90);
        let reply = bot.handle(&msg("!qa"), at).await.unwrap();
        assert!(reply.contains("Remaining time: 3h 58m."), "{reply}");
    }

    #[tokio::test]
    async fn help_lists_commands() {
        let (bot, _) = seeded(config()).await;
        let reply = bot.handle(&msg("!help"), t(1, 0, 0, 0)).await.unwrap();
        assert!(reply.contains("`!rbremove <boss>`"));
    }

    #[tokio::test]
    async fn far_future_update_is_rejected_without_writing() {
        let (bot, store) = seeded(config()).await;
        let reply = bot
            .handle(&msg("!update qa +262142-12-31 23:59"), t(1, 0, 0, 0))
            .await
            .unwrap();
        assert!(reply.contains("out of range"), "{reply}");
        assert!(store.get_death("qa", "guild-1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn unrepresentable_window_is_checked_before_the_write() {
        let (bot, store) = seeded(config()).await;
        let far = chrono::DateTime::<Utc>::MAX_UTC - Duration::hours(1);
        let cmd = Command::UpdateDeath {
            boss: "qa".into(),
            death_time: far,
        };
        assert_matches!(
            bot.execute(cmd, &msg(""), t(1, 0, 0, 0)).await,
            Err(CoreError::InvalidTimestamp(_))
        );
        assert!(store.get_death("qa", "guild-1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn stored_far_future_record_does_not_break_reads() {
        let (bot, store) = seeded(config()).await;
        let far = chrono::DateTime::<Utc>::MAX_UTC - Duration::hours(1);
        store
            .upsert_death("qa", "guild-1", far, "mallory", t(1, 0, 0, 0))
            .await
            .unwrap();

        let reply = bot.handle(&msg("!qa"), t(1, 0, 0, 0)).await.unwrap();
        assert!(reply.contains("out of range"), "{reply}");

        let reply = bot.handle(&msg("!epic"), t(1, 0, 0, 0)).await.unwrap();
        assert_eq!(reply, "No epic bosses are being tracked right now on this server.");
    }

    #[tokio::test]
    async fn store_outage_on_lookup_is_reported() {
        let store = Arc::new(UnavailableStore::new(false));
        let bot = Interpreter::new(store.clone(), config());

        let reply = bot.handle(&msg("!dead qa"), t(1, 0, 0, 0)).await.unwrap();
        assert_eq!(reply, DOWN_REPLY);
        assert_eq!(store.writes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn store_outage_on_write_is_reported() {
        let store = Arc::new(UnavailableStore::new(true));
        let bot = Interpreter::new(store.clone(), config());

        let reply = bot.handle(&msg("!dead qa"), t(1, 0, 0, 0)).await.unwrap();
        assert_eq!(reply, DOWN_REPLY);
        assert_eq!(store.writes.load(Ordering::SeqCst), 1);

        let reply = bot.handle(&msg("!epic"), t(1, 0, 0, 0)).await.unwrap();
        assert_eq!(reply, DOWN_REPLY);
    }
}
