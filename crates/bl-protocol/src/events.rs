//! Inbound events delivered by the chat bridge.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ids::{ChannelId, GuildId, MessageId, UserId};
use crate::reactions::ReactionToken;

/// A message posted in a channel the bot can see.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageEvent {
    pub message_id: MessageId,
    pub channel_id: ChannelId,
    /// Absent for direct messages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<GuildId>,
    pub author_id: UserId,
    /// Set for messages written by bots (including this one).
    #[serde(default)]
    pub author_is_bot: bool,
    pub text: String,
    #[serde(default = "Utc::now")]
    pub sent_at: DateTime<Utc>,
}

impl MessageEvent {
    /// Build a human-authored message (mostly used by tests and tooling).
    pub fn new(
        message_id: impl Into<MessageId>,
        channel_id: impl Into<ChannelId>,
        author_id: impl Into<UserId>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            message_id: message_id.into(),
            channel_id: channel_id.into(),
            guild_id: None,
            author_id: author_id.into(),
            author_is_bot: false,
            text: text.into(),
            sent_at: Utc::now(),
        }
    }

    pub fn in_guild(mut self, guild_id: impl Into<GuildId>) -> Self {
        self.guild_id = Some(guild_id.into());
        self
    }
}

/// A reaction added to a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionEvent {
    pub message_id: MessageId,
    pub channel_id: ChannelId,
    pub user_id: UserId,
    /// Set by the bridge for reactions added by bot accounts (ours included).
    #[serde(default)]
    pub user_is_bot: bool,
    pub token: ReactionToken,
}

impl ReactionEvent {
    pub fn new(
        message_id: impl Into<MessageId>,
        channel_id: impl Into<ChannelId>,
        user_id: impl Into<UserId>,
        token: impl Into<ReactionToken>,
    ) -> Self {
        Self {
            message_id: message_id.into(),
            channel_id: channel_id.into(),
            user_id: user_id.into(),
            user_is_bot: false,
            token: token.into(),
        }
    }
}

/// Bridge acknowledgement of an outbound send, carrying the id the
/// platform assigned to the new message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendAck {
    pub request_id: Uuid,
    pub message_id: MessageId,
}
