//! Genshin Impact mining tracker.
//!
//! Players record the day they mined their world; ore respawns three days
//! later. Days are counted from 2021-01-01 on the US Pacific calendar
//! (daylight saving time included).

use std::sync::Arc;

use anyhow::{Context, bail};
use async_trait::async_trait;
use chrono::{DateTime, Datelike, Utc};
use chrono_tz::America::Los_Angeles;

use bl_protocol::{Embed, MessageEvent, ReactionToken, colors};
use bl_router::{
    CommandHandler, CommandInvocation, HandlerDescriptor, IntentDescriptor, IntentHandler,
    IntentInvocation, RegistrationError, Registry,
};
use bl_store::{RowStore, Statement};

use crate::state::SharedState;

/// Schema for the mining table.
pub const MIGRATION: &str = include_str!("../../migrations/001_genshin_mine.sql");

/// Days until mined ore respawns.
pub const RESPAWN_DAYS: i64 = 3;

/// `NaiveDate::num_days_from_ce` of 2021-01-01.
const EPOCH_DAYS_FROM_CE: i32 = 737_791;

/// Whole days since 2021-01-01 on the US Pacific calendar.
pub fn day_stamp(now: DateTime<Utc>) -> i64 {
    let pacific = now.with_timezone(&Los_Angeles).date_naive();
    i64::from(pacific.num_days_from_ce() - EPOCH_DAYS_FROM_CE)
}

/// Days until a world mined on `stamp` is ready again, as of `today`.
pub fn days_left(stamp: i64, today: i64) -> i64 {
    (stamp + RESPAWN_DAYS - today).max(0)
}

/// Players split by whether their world is ready.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct MineReport {
    pub total: usize,
    pub ready: Vec<String>,
    /// Player name and days left.
    pub respawning: Vec<(String, i64)>,
}

impl MineReport {
    /// Partition `(player, day_stamp)` rows, keeping their order.
    pub fn from_stamps(worlds: impl IntoIterator<Item = (String, i64)>, today: i64) -> Self {
        let mut report = Self::default();
        for (player, stamp) in worlds {
            report.total += 1;
            match days_left(stamp, today) {
                0 => report.ready.push(player),
                days => report.respawning.push((player, days)),
            }
        }
        report
    }

    pub fn embed(&self, separator: &str) -> Embed {
        let ready = if self.ready.is_empty() {
            "None".to_string()
        } else {
            self.ready.join(separator)
        };
        let respawning = if self.respawning.is_empty() {
            "None".to_string()
        } else {
            self.respawning
                .iter()
                .map(|(player, days)| format!("{player} ({days})"))
                .collect::<Vec<_>>()
                .join(separator)
        };

        Embed::new(
            "List of Genshin Impact worlds",
            format!("There are a total of {} worlds in the database", self.total),
            colors::GENSHIN,
        )
        .field("**Ready:**", format!("> {ready}"))
        .field("**Respawning:**", format!("> {respawning}"))
    }
}

/// `mine` command and `genshin_mine` intent.
pub struct MineFeature {
    command: HandlerDescriptor,
    intent: IntentDescriptor,
    state: SharedState,
    store: Arc<dyn RowStore>,
}

impl MineFeature {
    pub fn new(state: SharedState, store: Arc<dyn RowStore>) -> Self {
        let prefix = &state.prefix;
        let command = HandlerDescriptor::new("mine", "Command to view Genshin mining respawn status")
            .aliases(&["mining"])
            .usage(format!("{prefix}mine [list/update] [args...]"))
            .example(format!("{prefix}mine update Breeze\n> {prefix}mine list"));
        let intent = IntentDescriptor::new(
            "genshin_mine",
            "Check whose Genshin Impact world is ready to be mined",
        );
        Self {
            command,
            intent,
            state,
            store,
        }
    }

    /// Record that `player` mined today.
    pub async fn update(&self, player: &str, now: DateTime<Utc>) -> anyhow::Result<()> {
        let statement = Statement::new(
            "INSERT INTO genshin_mine (player_name, day_stamp) VALUES ($1, $2) \
             ON CONFLICT (player_name) DO UPDATE SET day_stamp = EXCLUDED.day_stamp",
        )
        .bind(player)
        .bind(day_stamp(now));

        let affected = self.store.execute(&statement).await?;
        if affected != 1 {
            bail!("mining upsert for {player} touched {affected} rows");
        }
        tracing::info!(player = %player, "mining day updated");
        Ok(())
    }

    pub async fn report(&self, now: DateTime<Utc>) -> anyhow::Result<MineReport> {
        let statement =
            Statement::new("SELECT player_name, day_stamp FROM genshin_mine ORDER BY player_name");
        let rows = self.store.query(&statement).await?;

        let worlds = rows
            .iter()
            .map(|row| -> anyhow::Result<(String, i64)> {
                let player = row
                    .first()
                    .and_then(|v| v.as_text())
                    .context("player_name is not text")?;
                let stamp = row
                    .get(1)
                    .and_then(|v| v.as_int())
                    .context("day_stamp is not an integer")?;
                Ok((player.to_string(), stamp))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        Ok(MineReport::from_stamps(worlds, day_stamp(now)))
    }

    async fn show(&self, message: &MessageEvent) -> anyhow::Result<()> {
        self.state.typing(message.channel_id).await?;
        let report = self.report(Utc::now()).await?;
        self.state
            .reply_embed(message, report.embed(&self.state.separator))
            .await?;
        Ok(())
    }
}

#[async_trait]
impl CommandHandler for MineFeature {
    fn descriptor(&self) -> &HandlerDescriptor {
        &self.command
    }

    async fn on_command(&self, invocation: CommandInvocation<'_>) -> anyhow::Result<()> {
        let message = invocation.message;
        let prefix = &self.state.prefix;
        match invocation.args {
            [] => {
                self.state
                    .reply(message, format!("Invalid arguments! Check out `{prefix}help mine`"))
                    .await?;
            }
            [operation, ..] if operation == "list" || operation == "l" => {
                self.show(message).await?;
            }
            [operation, rest @ ..] if operation == "update" || operation == "u" => {
                let Some(player) = rest.first() else {
                    self.state
                        .reply(message, format!("Invalid arguments! Usage: `{prefix}mine update <name>`"))
                        .await?;
                    return Ok(());
                };
                self.update(player, Utc::now()).await?;
                self.state.react(message, ReactionToken::check()).await?;
            }
            _ => {
                self.state.react(message, ReactionToken::question()).await?;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl IntentHandler for MineFeature {
    fn descriptor(&self) -> &IntentDescriptor {
        &self.intent
    }

    async fn on_intent_detected(&self, invocation: IntentInvocation<'_>) -> anyhow::Result<()> {
        self.show(invocation.message).await
    }
}

pub fn register_all(
    registry: &mut Registry,
    state: &SharedState,
    store: Arc<dyn RowStore>,
) -> Result<(), RegistrationError> {
    let mine = Arc::new(MineFeature::new(state.clone(), store));
    registry.register_command(mine.clone())?;
    registry.register_intent(mine)?;
    Ok(())
}
