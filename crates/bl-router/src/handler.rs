//! Handler capability traits.
//!
//! A feature implements `CommandHandler`, `IntentHandler`, or both. The two
//! traits are independent; the registry keeps separate tables for each.

use async_trait::async_trait;
use bl_protocol::{ChannelId, GuildId, MessageEvent, UserId};

use crate::registry::Registry;

/// Identity and help text of a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerDescriptor {
    /// Primary invocation token, unique across the registry.
    pub name: String,
    /// Alternative tokens, also unique across the registry.
    pub aliases: Vec<String>,
    /// One-line description for help listings.
    pub description: String,
    pub usage: String,
    pub example: String,
}

impl HandlerDescriptor {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
            description: description.into(),
            usage: String::new(),
            example: String::new(),
        }
    }

    pub fn aliases(mut self, aliases: &[&str]) -> Self {
        self.aliases = aliases.iter().map(|a| a.to_string()).collect();
        self
    }

    pub fn usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = usage.into();
        self
    }

    pub fn example(mut self, example: impl Into<String>) -> Self {
        self.example = example.into();
        self
    }

    /// Name followed by aliases.
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }
}

/// Identity of an intent handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntentDescriptor {
    pub label: String,
    pub description: String,
}

impl IntentDescriptor {
    pub fn new(label: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            description: description.into(),
        }
    }
}

/// Everything a command handler gets for one invocation.
pub struct CommandInvocation<'a> {
    pub author: UserId,
    /// The token the user typed (the name or one of the aliases).
    pub token: &'a str,
    pub args: &'a [String],
    pub message: &'a MessageEvent,
    /// Read-only view of all registered handlers (for help listings).
    pub registry: &'a Registry,
}

impl CommandInvocation<'_> {
    pub fn channel(&self) -> ChannelId {
        self.message.channel_id
    }

    pub fn guild(&self) -> Option<GuildId> {
        self.message.guild_id
    }
}

/// Everything an intent handler gets for one detection.
pub struct IntentInvocation<'a> {
    pub author: UserId,
    pub confidence: f64,
    pub message: &'a MessageEvent,
}

impl IntentInvocation<'_> {
    pub fn channel(&self) -> ChannelId {
        self.message.channel_id
    }

    pub fn guild(&self) -> Option<GuildId> {
        self.message.guild_id
    }
}

/// A prefixed chat command.
///
/// Handlers validate their own arguments and send their own error replies.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    fn descriptor(&self) -> &HandlerDescriptor;

    async fn on_command(&self, invocation: CommandInvocation<'_>) -> anyhow::Result<()>;
}

/// A handler for free-text messages classified as one intent.
#[async_trait]
pub trait IntentHandler: Send + Sync {
    fn descriptor(&self) -> &IntentDescriptor;

    async fn on_intent_detected(&self, invocation: IntentInvocation<'_>) -> anyhow::Result<()>;
}
