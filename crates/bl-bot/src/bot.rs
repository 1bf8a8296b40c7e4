//! Per-event handling: filtering, routing and user-facing fallbacks.

use bl_protocol::{MessageEvent, ReactionEvent, ReactionToken};
use bl_router::{CommandOutcome, IntentOutcome, ReactionOutcome, RouteOutcome, Router};

use crate::config::ChannelFilter;
use crate::state::SharedState;

const FAILURE_REPLY: &str = "Something went wrong while handling that, sorry!";

pub struct Bot {
    state: SharedState,
    router: Router,
    filter: ChannelFilter,
}

impl Bot {
    pub fn new(state: SharedState, router: Router, filter: ChannelFilter) -> Self {
        Self {
            state,
            router,
            filter,
        }
    }

    pub fn state(&self) -> &SharedState {
        &self.state
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Handle one inbound message. Returns `None` when it was filtered out.
    pub async fn handle_message(&self, message: &MessageEvent) -> Option<RouteOutcome> {
        if message.author_is_bot {
            return None;
        }
        if !self.filter.allows(message) {
            tracing::debug!(
                channel = %message.channel_id,
                guild = ?message.guild_id,
                "message outside enabled guilds and channels"
            );
            return None;
        }

        let outcome = self
            .router
            .route(message, self.state.chat_enabled())
            .await;

        match &outcome {
            RouteOutcome::Command(CommandOutcome::UnknownCommand { .. }) => {
                if let Err(e) = self.state.react(message, ReactionToken::question()).await {
                    tracing::warn!(error = %e, "failed to react to unknown command");
                }
            }
            RouteOutcome::Command(CommandOutcome::Failed(_)) => {
                self.report_failure(message).await;
            }
            RouteOutcome::Intent(IntentOutcome::Failed(e)) => {
                // Intent replies stay silent on failure; the dispatcher logged it.
                tracing::debug!(error = %e, "intent handler failed, not replying");
            }
            _ => {}
        }
        Some(outcome)
    }

    /// Feed one reaction to the confirmation engine. Reactions by bot
    /// accounts are ignored.
    pub async fn handle_reaction(&self, reaction: &ReactionEvent) -> Option<ReactionOutcome> {
        if reaction.user_is_bot {
            return None;
        }
        Some(self.state.confirmations.on_reaction(reaction).await)
    }

    async fn report_failure(&self, message: &MessageEvent) {
        if let Err(e) = self.state.reply(message, FAILURE_REPLY).await {
            tracing::warn!(error = %e, "failed to send failure reply");
        }
        if let Err(e) = self.state.react(message, ReactionToken::cross()).await {
            tracing::warn!(error = %e, "failed to react to failed command");
        }
    }
}
