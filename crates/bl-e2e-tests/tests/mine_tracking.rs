//! E2E tests for the Genshin mining tracker, command and intent sides.

mod helpers;

use chrono::Utc;

use bl_bot::features::genshin::{MineFeature, RESPAWN_DAYS, day_stamp};
use bl_protocol::ReactionToken;
use bl_router::{CommandOutcome, IntentOutcome, RouteOutcome};
use bl_store::Value;

use helpers::TestHarness;

/// `/mine update` upserts today's stamp for the player and confirms with a check.
#[tokio::test]
async fn e2e_mine_update_records_today() {
    let h = TestHarness::new();

    let (message, outcome) = h.say("/mine update Breeze").await;
    assert!(matches!(
        outcome,
        Some(RouteOutcome::Command(CommandOutcome::Handled { ref command })) if command == "mine"
    ));

    let executed = h.store.executed();
    assert_eq!(executed.len(), 1);
    assert!(executed[0].sql.contains("ON CONFLICT (player_name)"));
    assert_eq!(executed[0].params[0], Value::Text("Breeze".into()));
    let stamp = executed[0].params[1].as_int().unwrap();
    assert!((stamp - day_stamp(Utc::now())).abs() <= 1);

    assert_eq!(
        h.transport.reactions_on(message.message_id),
        vec![ReactionToken::check()]
    );
}

/// `/mine list` splits players into ready and respawning worlds.
#[tokio::test]
async fn e2e_mine_list_reports_worlds() {
    let h = TestHarness::new();
    let today = day_stamp(Utc::now());
    h.store.queue_rows(vec![
        vec![Value::from("Amber"), Value::Int(today - 10)],
        vec![Value::from("Breeze"), Value::Int(today)],
    ]);

    h.say("/mining list").await;

    let embed = h.transport.last_sent().unwrap().embed.unwrap();
    assert_eq!(embed.field_value("**Ready:**"), Some("> Amber"));
    assert_eq!(
        embed.field_value("**Respawning:**"),
        Some(format!("> Breeze ({RESPAWN_DAYS})").as_str())
    );
    assert!(h.store.queried()[0].sql.contains("ORDER BY player_name"));
}

/// The `genshin_mine` intent shows the same report without any command.
#[tokio::test]
async fn e2e_mine_intent_shows_report() {
    let h = TestHarness::new();
    h.classifier.answer(&[("genshin_mine", 0.97)]);

    let (_, outcome) = h.say("whose world can I mine?").await;
    assert!(matches!(
        outcome,
        Some(RouteOutcome::Intent(IntentOutcome::Handled { ref label, .. })) if label == "genshin_mine"
    ));
    assert_eq!(h.store.queried().len(), 1);
    assert!(h.transport.last_sent().unwrap().embed.is_some());
}

/// A failing upsert becomes the generic failure reply plus a cross.
#[tokio::test]
async fn e2e_mine_update_store_failure() {
    let h = TestHarness::new();
    h.store.queue_failure("connection reset");

    let (message, outcome) = h.say("/mine update Breeze").await;
    assert!(matches!(
        outcome,
        Some(RouteOutcome::Command(CommandOutcome::Failed(_)))
    ));
    assert_eq!(
        h.transport.last_sent().unwrap().content.as_deref(),
        Some("Something went wrong while handling that, sorry!")
    );
    assert_eq!(
        h.transport.reactions_on(message.message_id),
        vec![ReactionToken::cross()]
    );
}

/// An upsert touching an unexpected number of rows is treated as a failure.
#[tokio::test]
async fn e2e_mine_update_unexpected_row_count() {
    let h = TestHarness::new();
    h.store.queue_affected(0);

    let (_, outcome) = h.say("/mine u Breeze").await;
    assert!(matches!(
        outcome,
        Some(RouteOutcome::Command(CommandOutcome::Failed(_)))
    ));
}

/// Missing player name gets a usage hint and touches no rows.
#[tokio::test]
async fn e2e_mine_update_without_name() {
    let h = TestHarness::new();

    h.say("/mine update").await;
    let reply = h.transport.last_sent().unwrap().content.unwrap();
    assert!(reply.contains("/mine update <name>"));
    assert!(h.store.executed().is_empty());
}

/// Names listed in one report field, `None` meaning an empty field.
fn listed(embed: &bl_protocol::Embed, field: &str) -> Vec<String> {
    let value = embed.field_value(field).unwrap();
    let names = value.strip_prefix("> ").unwrap();
    if names == "None" {
        return Vec::new();
    }
    names
        .split(", ")
        .map(|entry| entry.split(" (").next().unwrap().to_string())
        .collect()
}

/// Updating a player and listing puts them in exactly one partition,
/// moving from respawning to ready once the respawn days have passed.
#[tokio::test]
async fn e2e_mine_update_then_list_partitions_player() {
    let h = TestHarness::new();

    h.say("/mine update Breeze").await;
    let stamp = h.store.executed()[0].params[1].clone();
    let stamp_day = stamp.as_int().unwrap();

    // Fresh update, listed today: still respawning.
    h.store.queue_rows(vec![vec![Value::from("Breeze"), stamp.clone()]]);
    h.say("/mine list").await;
    let embed = h.transport.last_sent().unwrap().embed.unwrap();
    assert_eq!(listed(&embed, "**Ready:**"), Vec::<String>::new());
    assert_eq!(listed(&embed, "**Respawning:**"), ["Breeze"]);
    assert_eq!(
        embed.field_value("**Respawning:**"),
        Some(format!("> Breeze ({RESPAWN_DAYS})").as_str())
    );

    // Same row, RESPAWN_DAYS later: ready.
    let mine = MineFeature::new(h.state.clone(), h.store.clone());
    let later = Utc::now() + chrono::Duration::days(RESPAWN_DAYS);
    assert!(day_stamp(later) >= stamp_day + RESPAWN_DAYS);
    h.store.queue_rows(vec![vec![Value::from("Breeze"), stamp]]);
    let report = mine.report(later).await.unwrap();
    let embed = report.embed(", ");
    assert_eq!(listed(&embed, "**Ready:**"), ["Breeze"]);
    assert_eq!(listed(&embed, "**Respawning:**"), Vec::<String>::new());
    assert_eq!(report.total, 1);
}
