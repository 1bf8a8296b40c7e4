//! State shared by every feature handler.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use bl_gateway::Transport;
use bl_protocol::{ChannelId, Embed, MessageEvent, MessageId, OutboundMessage, ReactionToken};
use bl_router::ConfirmationEngine;

use crate::config::BotConfig;

pub type SharedState = Arc<BotState>;

/// Transport handle, pending confirmations and runtime toggles.
pub struct BotState {
    pub transport: Arc<dyn Transport>,
    pub confirmations: Arc<ConfirmationEngine>,
    /// Command prefix, for usage strings in replies.
    pub prefix: String,
    /// Separator for lists in replies.
    pub separator: String,
    chat_enabled: AtomicBool,
}

impl BotState {
    pub fn new(transport: Arc<dyn Transport>, config: &BotConfig) -> Self {
        Self::with_settings(transport, &config.prefix, &config.separator, config.chat_enabled)
    }

    pub fn with_settings(
        transport: Arc<dyn Transport>,
        prefix: &str,
        separator: &str,
        chat_enabled: bool,
    ) -> Self {
        Self {
            transport,
            confirmations: Arc::new(ConfirmationEngine::new()),
            prefix: prefix.to_string(),
            separator: separator.to_string(),
            chat_enabled: AtomicBool::new(chat_enabled),
        }
    }

    pub fn chat_enabled(&self) -> bool {
        self.chat_enabled.load(Ordering::SeqCst)
    }

    /// Flip the natural-language interface and return the new setting.
    pub fn toggle_chat(&self) -> bool {
        !self.chat_enabled.fetch_xor(true, Ordering::SeqCst)
    }

    // ── Reply helpers ─────────────────────────────────────────

    pub async fn reply(
        &self,
        message: &MessageEvent,
        content: impl Into<String>,
    ) -> anyhow::Result<MessageId> {
        Ok(self
            .transport
            .send(OutboundMessage::reply_text(message, content))
            .await?)
    }

    pub async fn reply_embed(&self, message: &MessageEvent, embed: Embed) -> anyhow::Result<MessageId> {
        Ok(self
            .transport
            .send(OutboundMessage::reply_embed(message, embed))
            .await?)
    }

    pub async fn react(&self, message: &MessageEvent, token: ReactionToken) -> anyhow::Result<()> {
        Ok(self
            .transport
            .react(message.channel_id, message.message_id, token)
            .await?)
    }

    pub async fn typing(&self, channel_id: ChannelId) -> anyhow::Result<()> {
        Ok(self.transport.typing(channel_id).await?)
    }

    /// Join items with the configured separator.
    pub fn join<I, S>(&self, items: I) -> String
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        items
            .into_iter()
            .map(|s| s.as_ref().to_string())
            .collect::<Vec<_>>()
            .join(&self.separator)
    }
}
