//! Periodic expiry of abandoned confirmations.

use std::time::Duration;

use chrono::Utc;
use tokio::time;

use bl_router::ConfirmationEngine;

/// Drop confirmations older than `ttl` every `interval`.
///
/// Runs forever; intended for a `tokio::select!` arm or a spawned task.
pub async fn run(engine: &ConfirmationEngine, interval: Duration, ttl: chrono::Duration) {
    let mut ticker = time::interval(interval);
    // Skip the first tick (fires immediately).
    ticker.tick().await;

    loop {
        ticker.tick().await;

        let expired = engine.sweep_expired(Utc::now(), ttl);
        for message_id in &expired {
            tracing::debug!(message_id = %message_id, "confirmation abandoned");
        }
        tracing::trace!(pending = engine.pending(), "confirmation sweep done");
    }
}
