//! Prefixed command dispatch.

use std::sync::Arc;

use bl_protocol::MessageEvent;

use crate::error::DispatchError;
use crate::handler::CommandInvocation;
use crate::registry::Registry;

/// A message split into its invocation token and arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    pub token: String,
    pub args: Vec<String>,
}

impl ParsedCommand {
    /// Strip `prefix` and split the rest on whitespace.
    ///
    /// Returns `None` when the text does not start with the prefix. A bare
    /// prefix yields an empty token.
    pub fn parse(text: &str, prefix: &str) -> Option<Self> {
        let rest = text.strip_prefix(prefix)?;
        let mut words = rest.split_whitespace().map(str::to_string);
        let token = words.next().unwrap_or_default();
        Some(Self {
            token,
            args: words.collect(),
        })
    }
}

/// What happened to one message at the command stage.
#[derive(Debug)]
pub enum CommandOutcome {
    /// No prefix; the message belongs to the intent stage.
    NoMatch,
    /// Prefixed, but the token names no command or alias.
    UnknownCommand { token: String },
    Handled { command: String },
    Failed(DispatchError),
}

impl CommandOutcome {
    pub fn is_no_match(&self) -> bool {
        matches!(self, Self::NoMatch)
    }
}

/// Routes prefixed messages to command handlers.
pub struct CommandDispatcher {
    registry: Arc<Registry>,
    prefix: String,
}

impl CommandDispatcher {
    pub fn new(registry: Arc<Registry>, prefix: impl Into<String>) -> Self {
        Self {
            registry,
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Dispatch one message. Handler errors are logged and returned as
    /// `Failed`; they never propagate.
    pub async fn dispatch(&self, message: &MessageEvent) -> CommandOutcome {
        let Some(parsed) = ParsedCommand::parse(&message.text, &self.prefix) else {
            return CommandOutcome::NoMatch;
        };

        let Some(handler) = self.registry.resolve_command(&parsed.token) else {
            tracing::debug!(
                token = %parsed.token,
                channel = %message.channel_id,
                "unknown command"
            );
            return CommandOutcome::UnknownCommand {
                token: parsed.token,
            };
        };

        let command = handler.descriptor().name.clone();
        tracing::info!(
            command = %command,
            token = %parsed.token,
            args = parsed.args.len(),
            author = %message.author_id,
            "dispatching command"
        );

        let invocation = CommandInvocation {
            author: message.author_id,
            token: &parsed.token,
            args: &parsed.args,
            message,
            registry: &self.registry,
        };

        match handler.on_command(invocation).await {
            Ok(()) => CommandOutcome::Handled { command },
            Err(cause) => {
                tracing::error!(command = %command, error = %format!("{cause:#}"), "command handler failed");
                CommandOutcome::Failed(DispatchError::Command { command, cause })
            }
        }
    }
}
