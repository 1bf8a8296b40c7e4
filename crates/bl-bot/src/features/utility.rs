//! General-purpose commands: help, ping, test.

use std::sync::Arc;

use async_trait::async_trait;

use bl_protocol::{Embed, ReactionToken, colors, reactions};
use bl_router::{CommandHandler, CommandInvocation, HandlerDescriptor, RegistrationError, Registry};

use crate::state::SharedState;

pub struct HelpCommand {
    descriptor: HandlerDescriptor,
    state: SharedState,
}

impl HelpCommand {
    pub fn new(state: SharedState) -> Self {
        let prefix = &state.prefix;
        let descriptor = HandlerDescriptor::new("help", "Show help message for a command")
            .aliases(&["?"])
            .usage(format!("{prefix}help [command]"))
            .example(format!("{prefix}help ping"));
        Self { descriptor, state }
    }

    fn general_embed(&self, registry: &Registry) -> Embed {
        let prefix = &self.state.prefix;
        let names = self
            .state
            .join(registry.list_commands().iter().map(|d| d.name.as_str()));
        Embed::new(
            "List of available commands",
            format!("Here's how to use my commands: `{prefix}<command> [arguments...]`"),
            colors::HELP,
        )
        .field("**List of commands:**", format!("> {names}"))
        .footer(format!("For more information, check out '{prefix}help [command]'"))
    }

    fn unknown_embed(&self, token: &str) -> Embed {
        Embed::new(
            format!("Unknown command \"{token}\""),
            format!(
                "That is not a valid command, check out a list of commands with `{}help`",
                self.state.prefix
            ),
            colors::HELP,
        )
    }
}

/// Help card for one command.
pub fn command_embed(descriptor: &HandlerDescriptor, separator: &str) -> Embed {
    let mut embed = Embed::new(
        format!("Command \"{}\"", descriptor.name),
        descriptor.description.clone(),
        colors::HELP,
    );
    if !descriptor.aliases.is_empty() {
        embed = embed.field("**Aliases:**", format!("> {}", descriptor.aliases.join(separator)));
    }
    if !descriptor.usage.is_empty() {
        embed = embed.field("**Usage:**", format!("> {}", descriptor.usage));
    }
    if !descriptor.example.is_empty() {
        embed = embed.field("**Example:**", format!("> {}", descriptor.example));
    }
    embed
}

#[async_trait]
impl CommandHandler for HelpCommand {
    fn descriptor(&self) -> &HandlerDescriptor {
        &self.descriptor
    }

    async fn on_command(&self, invocation: CommandInvocation<'_>) -> anyhow::Result<()> {
        let message = invocation.message;
        let embed = match invocation.args {
            [] => self.general_embed(invocation.registry),
            [token] => match invocation.registry.resolve_command(token) {
                Some(handler) => command_embed(handler.descriptor(), &self.state.separator),
                None => self.unknown_embed(token),
            },
            _ => return self.state.react(message, ReactionToken::question()).await,
        };
        self.state.reply_embed(message, embed).await?;
        Ok(())
    }
}

pub struct PingCommand {
    descriptor: HandlerDescriptor,
    state: SharedState,
}

impl PingCommand {
    pub fn new(state: SharedState) -> Self {
        Self {
            descriptor: HandlerDescriptor::new(
                "ping",
                "Check my connection speed to the chat server",
            ),
            state,
        }
    }
}

#[async_trait]
impl CommandHandler for PingCommand {
    fn descriptor(&self) -> &HandlerDescriptor {
        &self.descriptor
    }

    async fn on_command(&self, invocation: CommandInvocation<'_>) -> anyhow::Result<()> {
        let latency = self.state.transport.latency().as_millis();
        self.state
            .reply(
                invocation.message,
                format!("{} Pong! {latency}ms", reactions::PING_PONG),
            )
            .await?;
        Ok(())
    }
}

/// Placeholder for manual testing; answers with a cross.
pub struct TestCommand {
    descriptor: HandlerDescriptor,
    state: SharedState,
}

impl TestCommand {
    pub fn new(state: SharedState) -> Self {
        Self {
            descriptor: HandlerDescriptor::new("test", "Placeholder command for testing uses only"),
            state,
        }
    }
}

#[async_trait]
impl CommandHandler for TestCommand {
    fn descriptor(&self) -> &HandlerDescriptor {
        &self.descriptor
    }

    async fn on_command(&self, invocation: CommandInvocation<'_>) -> anyhow::Result<()> {
        self.state
            .react(invocation.message, ReactionToken::cross())
            .await
    }
}

pub fn register_all(registry: &mut Registry, state: &SharedState) -> Result<(), RegistrationError> {
    registry.register_command(Arc::new(HelpCommand::new(state.clone())))?;
    registry.register_command(Arc::new(PingCommand::new(state.clone())))?;
    registry.register_command(Arc::new(TestCommand::new(state.clone())))?;
    Ok(())
}
