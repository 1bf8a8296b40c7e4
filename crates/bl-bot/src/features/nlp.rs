//! Commands administering the natural-language interface.
//!
//! `intent add` is the one destructive operation here: the utterance is
//! written to the model only after the requester confirms with a reaction.

use std::sync::Arc;

use async_trait::async_trait;

use bl_classifier::UtteranceModel;
use bl_protocol::{
    ChannelId, Embed, MessageEvent, MessageId, ReactionToken, UserId, colors, reactions,
};
use bl_router::{
    CommandHandler, CommandInvocation, ConfirmationEntry, Continuation, HandlerDescriptor,
    RegistrationError, Registry,
};

use crate::state::SharedState;

const PENDING_CHANGES_FOOTER: &str =
    "* there are some pending changes to the model, reload to see them in action";

pub struct ToggleCommand {
    descriptor: HandlerDescriptor,
    state: SharedState,
}

impl ToggleCommand {
    pub fn new(state: SharedState) -> Self {
        Self {
            descriptor: HandlerDescriptor::new("toggle", "Toggle my NLP chat interface")
                .aliases(&["t"]),
            state,
        }
    }
}

#[async_trait]
impl CommandHandler for ToggleCommand {
    fn descriptor(&self) -> &HandlerDescriptor {
        &self.descriptor
    }

    async fn on_command(&self, invocation: CommandInvocation<'_>) -> anyhow::Result<()> {
        let enabled = self.state.toggle_chat();
        let token = if enabled {
            reactions::UNMUTE
        } else {
            reactions::MUTE
        };
        tracing::info!(
            enabled,
            by = %invocation.author,
            "NLP chat interface toggled"
        );
        self.state.react(invocation.message, token.into()).await
    }
}

pub struct IntentCommand {
    descriptor: HandlerDescriptor,
    state: SharedState,
    model: Arc<UtteranceModel>,
}

impl IntentCommand {
    pub fn new(state: SharedState, model: Arc<UtteranceModel>) -> Self {
        let prefix = &state.prefix;
        let descriptor =
            HandlerDescriptor::new("intent", "Command to view and modify my NLP intents")
                .aliases(&["i", "intents"])
                .usage(format!("{prefix}intent <info/list/add/reload> [args...]"))
                .example(format!(
                    "{prefix}intent info greeting\n> {prefix}intent add greeting good morning"
                ));
        Self {
            descriptor,
            state,
            model,
        }
    }

    async fn usage(&self, message: &MessageEvent, usage: &str) -> anyhow::Result<()> {
        self.state
            .reply(
                message,
                format!("Invalid arguments! Usage: `{}intent {usage}`", self.state.prefix),
            )
            .await?;
        Ok(())
    }

    fn with_footer(&self, embed: Embed) -> Embed {
        if self.model.has_pending_changes() {
            embed.footer(PENDING_CHANGES_FOOTER)
        } else {
            embed
        }
    }

    fn info_embed(&self, label: &str) -> Embed {
        let embed = match self.model.utterances(label) {
            Some(utterances) => Embed::new(
                format!("Information about intent \"{label}\""),
                format!(
                    "There is currently a total of **{}** utterances for \"{label}\"",
                    utterances.len()
                ),
                colors::NLP,
            )
            .field(
                "**Utterances:**",
                format!("> {}", quote_join(&utterances, &self.state.separator)),
            ),
            None => self.not_found_embed(label),
        };
        self.with_footer(embed)
    }

    fn not_found_embed(&self, label: &str) -> Embed {
        Embed::new(
            format!("Intent \"{label}\" not found"),
            format!(
                "Try using `{}intent list` to view all intents",
                self.state.prefix
            ),
            colors::NLP,
        )
    }

    fn list_embed(&self) -> Embed {
        let intents = self.model.intents();
        let embed = Embed::new(
            "List of intents in my NLP module",
            format!("There is currently a total of **{}** intents", intents.len()),
            colors::NLP,
        )
        .field("**Intents:**", format!("> {}", self.state.join(&intents)));
        self.with_footer(embed)
    }

    /// Post the confirmation prompt and park the edit on it.
    async fn propose(
        &self,
        message: &MessageEvent,
        author: UserId,
        label: &str,
        utterance: String,
    ) -> anyhow::Result<()> {
        if self.model.utterances(label).is_none() {
            self.state
                .reply_embed(message, self.with_footer(self.not_found_embed(label)))
                .await?;
            return Ok(());
        }

        let prompt = proposal_embed(label, &utterance, "Confirm with a reaction");
        let prompt_id = self.state.reply_embed(message, prompt).await?;

        let continuation = AddUtterance {
            state: self.state.clone(),
            model: self.model.clone(),
            channel_id: message.channel_id,
            prompt_id,
            label: label.to_string(),
            utterance,
        };
        self.state.confirmations.register(ConfirmationEntry::new(
            prompt_id,
            author,
            [ReactionToken::check(), ReactionToken::cross()],
            continuation,
        ))?;

        let channel = message.channel_id;
        self.state
            .transport
            .react(channel, prompt_id, ReactionToken::check())
            .await?;
        self.state
            .transport
            .react(channel, prompt_id, ReactionToken::cross())
            .await?;
        Ok(())
    }
}

#[async_trait]
impl CommandHandler for IntentCommand {
    fn descriptor(&self) -> &HandlerDescriptor {
        &self.descriptor
    }

    async fn on_command(&self, invocation: CommandInvocation<'_>) -> anyhow::Result<()> {
        let message = invocation.message;
        let Some((operation, rest)) = invocation.args.split_first() else {
            self.state
                .reply(
                    message,
                    format!(
                        "Invalid arguments! Check out `{}help intent`",
                        self.state.prefix
                    ),
                )
                .await?;
            return Ok(());
        };

        match operation.as_str() {
            "info" | "i" => {
                let Some(label) = rest.first() else {
                    return self.usage(message, "info <intent_name>").await;
                };
                self.state.reply_embed(message, self.info_embed(label)).await?;
            }
            "list" | "l" => {
                self.state.reply_embed(message, self.list_embed()).await?;
            }
            "add" | "a" => {
                let [label, words @ ..] = rest else {
                    return self.usage(message, "add <intent_name> <utterance...>").await;
                };
                if words.is_empty() {
                    return self.usage(message, "add <intent_name> <utterance...>").await;
                }
                self.propose(message, invocation.author, label, words.join(" "))
                    .await?;
            }
            "reload" | "r" => {
                self.state.typing(message.channel_id).await?;
                let count = self.model.reload();
                self.state
                    .reply(message, format!("Reloaded my NLP model with {count} intents"))
                    .await?;
            }
            _ => {
                self.state.react(message, ReactionToken::question()).await?;
            }
        }
        Ok(())
    }
}

/// Runs once the requester answers the `intent add` prompt.
struct AddUtterance {
    state: SharedState,
    model: Arc<UtteranceModel>,
    channel_id: ChannelId,
    prompt_id: MessageId,
    label: String,
    utterance: String,
}

#[async_trait]
impl Continuation for AddUtterance {
    async fn resolve(self: Box<Self>, token: ReactionToken) -> anyhow::Result<()> {
        let status = if token == ReactionToken::check() {
            match self.model.add_utterance(&self.label, &self.utterance) {
                Ok(()) => "Added, reload to see it in action".to_string(),
                Err(e) => {
                    let embed = proposal_embed(&self.label, &self.utterance, &format!("Failed: {e}"));
                    self.state
                        .transport
                        .edit(self.channel_id, self.prompt_id, embed)
                        .await?;
                    return Err(e.into());
                }
            }
        } else {
            "Cancelled".to_string()
        };

        let embed = proposal_embed(&self.label, &self.utterance, &status);
        self.state
            .transport
            .edit(self.channel_id, self.prompt_id, embed)
            .await?;
        Ok(())
    }
}

fn proposal_embed(label: &str, utterance: &str, status: &str) -> Embed {
    Embed::new(
        format!("Add utterance to intent \"{label}\""),
        format!("\"{utterance}\""),
        colors::NLP,
    )
    .field("**Status:**", status)
}

/// `"a", "b"` style join.
fn quote_join(items: &[String], separator: &str) -> String {
    items
        .iter()
        .map(|item| format!("\"{item}\""))
        .collect::<Vec<_>>()
        .join(separator)
}

pub fn register_all(
    registry: &mut Registry,
    state: &SharedState,
    model: Arc<UtteranceModel>,
) -> Result<(), RegistrationError> {
    registry.register_command(Arc::new(ToggleCommand::new(state.clone())))?;
    registry.register_command(Arc::new(IntentCommand::new(state.clone(), model)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::BotState;
    use bl_classifier::IntentUtterances;
    use bl_gateway::MockTransport;
    use bl_protocol::ReactionEvent;
    use bl_router::{CommandDispatcher, CommandOutcome, ReactionOutcome};

    struct Fixture {
        transport: Arc<MockTransport>,
        state: SharedState,
        model: Arc<UtteranceModel>,
        dispatcher: CommandDispatcher,
    }

    fn fixture() -> Fixture {
        let transport = Arc::new(MockTransport::new());
        let state = Arc::new(BotState::with_settings(transport.clone(), "/", ", ", true));
        let model = Arc::new(UtteranceModel::from_intents(vec![
            IntentUtterances::new("greeting", &["hello", "hi there"]),
            IntentUtterances::new("farewell", &["bye"]),
        ]));
        let mut registry = Registry::new();
        register_all(&mut registry, &state, model.clone()).unwrap();
        Fixture {
            transport,
            state,
            model,
            dispatcher: CommandDispatcher::new(Arc::new(registry), "/"),
        }
    }

    fn message(text: &str) -> MessageEvent {
        MessageEvent::new(MessageId(1), ChannelId(2), UserId(3), text)
    }

    #[tokio::test]
    async fn toggle_flips_chat_and_reacts() {
        let f = fixture();
        f.dispatcher.dispatch(&message("/t")).await;
        assert!(!f.state.chat_enabled());
        f.dispatcher.dispatch(&message("/toggle")).await;
        assert!(f.state.chat_enabled());

        let tokens = f.transport.reactions_on(MessageId(1));
        assert_eq!(
            tokens,
            vec![ReactionToken::new(reactions::MUTE), ReactionToken::new(reactions::UNMUTE)]
        );
    }

    #[tokio::test]
    async fn intent_list_and_info() {
        let f = fixture();
        f.dispatcher.dispatch(&message("/intent list")).await;
        let embed = f.transport.last_sent().unwrap().embed.unwrap();
        assert_eq!(embed.field_value("**Intents:**"), Some("> greeting, farewell"));
        assert!(embed.footer.is_none());

        f.dispatcher.dispatch(&message("/i i greeting")).await;
        let embed = f.transport.last_sent().unwrap().embed.unwrap();
        assert_eq!(embed.field_value("**Utterances:**"), Some("> \"hello\", \"hi there\""));

        f.dispatcher.dispatch(&message("/intents info weather")).await;
        let embed = f.transport.last_sent().unwrap().embed.unwrap();
        assert_eq!(embed.title, "Intent \"weather\" not found");
    }

    #[tokio::test]
    async fn missing_arguments_get_usage() {
        let f = fixture();
        f.dispatcher.dispatch(&message("/intent")).await;
        let reply = f.transport.last_sent().unwrap().content.unwrap();
        assert!(reply.contains("/help intent"));

        f.dispatcher.dispatch(&message("/intent add greeting")).await;
        let reply = f.transport.last_sent().unwrap().content.unwrap();
        assert!(reply.contains("add <intent_name> <utterance...>"));
        assert_eq!(f.state.confirmations.pending(), 0);
    }

    #[tokio::test]
    async fn unknown_operation_reacts_question() {
        let f = fixture();
        let outcome = f.dispatcher.dispatch(&message("/intent delete greeting")).await;
        assert!(matches!(outcome, CommandOutcome::Handled { .. }));
        assert_eq!(f.transport.reactions_on(MessageId(1)), vec![ReactionToken::question()]);
    }

    #[tokio::test]
    async fn add_waits_for_confirmation() {
        let f = fixture();
        f.dispatcher
            .dispatch(&message("/intent add greeting good   morning"))
            .await;

        let (prompt, prompt_id) = f.transport.sent().pop().unwrap();
        assert_eq!(prompt.embed.unwrap().description, "\"good morning\"");
        assert_eq!(
            f.transport.reactions_on(prompt_id),
            vec![ReactionToken::check(), ReactionToken::cross()]
        );
        assert!(f.state.confirmations.is_pending(prompt_id));
        assert_eq!(f.model.utterances("greeting").unwrap().len(), 2);

        let outcome = f
            .state
            .confirmations
            .on_reaction(&ReactionEvent::new(prompt_id, ChannelId(2), UserId(3), ReactionToken::check()))
            .await;
        assert_eq!(outcome, ReactionOutcome::Resolved(ReactionToken::check()));
        assert_eq!(
            f.model.utterances("greeting").unwrap(),
            ["hello", "hi there", "good morning"]
        );
        assert!(f.model.has_pending_changes());

        let edit = f.transport.edits().pop().unwrap();
        assert_eq!(edit.message_id, prompt_id);
        assert_eq!(edit.embed.field_value("**Status:**"), Some("Added, reload to see it in action"));
    }

    #[tokio::test]
    async fn add_cancelled_by_cross() {
        let f = fixture();
        f.dispatcher.dispatch(&message("/i a farewell see you")).await;
        let (_, prompt_id) = f.transport.sent().pop().unwrap();

        f.state
            .confirmations
            .on_reaction(&ReactionEvent::new(prompt_id, ChannelId(2), UserId(3), ReactionToken::cross()))
            .await;
        assert_eq!(f.model.utterances("farewell").unwrap(), ["bye"]);
        let edit = f.transport.edits().pop().unwrap();
        assert_eq!(edit.embed.field_value("**Status:**"), Some("Cancelled"));
    }

    #[tokio::test]
    async fn add_to_unknown_intent_registers_nothing() {
        let f = fixture();
        f.dispatcher.dispatch(&message("/intent add weather is it raining")).await;
        let embed = f.transport.last_sent().unwrap().embed.unwrap();
        assert_eq!(embed.title, "Intent \"weather\" not found");
        assert_eq!(f.state.confirmations.pending(), 0);
    }

    #[tokio::test]
    async fn reload_clears_pending_footer() {
        let f = fixture();
        f.model.add_utterance("greeting", "yo").unwrap();

        f.dispatcher.dispatch(&message("/intent list")).await;
        let embed = f.transport.last_sent().unwrap().embed.unwrap();
        assert_eq!(embed.footer.as_deref(), Some(PENDING_CHANGES_FOOTER));

        f.dispatcher.dispatch(&message("/intent reload")).await;
        assert_eq!(
            f.transport.last_sent().unwrap().content.as_deref(),
            Some("Reloaded my NLP model with 2 intents")
        );
        assert!(!f.model.has_pending_changes());
    }
}
