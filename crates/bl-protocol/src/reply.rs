//! Outbound requests the bot publishes to the chat bridge.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::events::MessageEvent;
use crate::ids::{ChannelId, MessageId};
use crate::reactions::ReactionToken;

/// Embed accent colors per feature area.
pub mod colors {
    pub const HELP: u32 = 0x5865F2;
    pub const NLP: u32 = 0xEB459E;
    pub const GENSHIN: u32 = 0xF1C40F;
    pub const ERROR: u32 = 0xED4245;
}

/// A titled field inside an embed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub inline: bool,
}

/// Structured rich reply.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Embed {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub color: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<EmbedField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer: Option<String>,
}

impl Embed {
    pub fn new(title: impl Into<String>, description: impl Into<String>, color: u32) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            color,
            fields: Vec::new(),
            footer: None,
        }
    }

    /// Append a full-width field.
    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push(EmbedField {
            name: name.into(),
            value: value.into(),
            inline: false,
        });
        self
    }

    pub fn footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = Some(footer.into());
        self
    }

    /// Look up a field value by name.
    pub fn field_value(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.value.as_str())
    }
}

/// Request to post a new message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundMessage {
    /// Correlates the bridge's `SendAck` with this request.
    pub request_id: Uuid,
    pub channel_id: ChannelId,
    /// Message this one replies to, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<MessageId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embed: Option<Embed>,
}

impl OutboundMessage {
    /// Plain-text reply to `message`.
    pub fn reply_text(message: &MessageEvent, content: impl Into<String>) -> Self {
        Self {
            request_id: Uuid::now_v7(),
            channel_id: message.channel_id,
            reply_to: Some(message.message_id),
            content: Some(content.into()),
            embed: None,
        }
    }

    /// Embed reply to `message`.
    pub fn reply_embed(message: &MessageEvent, embed: Embed) -> Self {
        Self {
            request_id: Uuid::now_v7(),
            channel_id: message.channel_id,
            reply_to: Some(message.message_id),
            content: None,
            embed: Some(embed),
        }
    }
}

/// Request to replace the embed of a message the bot sent earlier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditRequest {
    pub channel_id: ChannelId,
    pub message_id: MessageId,
    pub embed: Embed,
}

/// Request to add a reaction to a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactRequest {
    pub channel_id: ChannelId,
    pub message_id: MessageId,
    pub token: ReactionToken,
}

/// Request to show the typing indicator in a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypingRequest {
    pub channel_id: ChannelId,
}
