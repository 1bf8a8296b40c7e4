//! Shared test harness for E2E integration tests.
//!
//! Wires the real feature registry, router and confirmation engine to a
//! `MockTransport` and `MockRowStore`, so every scenario exercises the same
//! code paths as the running bot minus the broker and the database.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use bl_bot::bot::Bot;
use bl_bot::config::ChannelFilter;
use bl_bot::features::build_registry;
use bl_bot::state::{BotState, SharedState};
use bl_classifier::{
    ClassificationError, ClassificationResult, ClassifierGateway, ClassifierResult,
    IntentUtterances, UtteranceModel,
};
use bl_gateway::MockTransport;
use bl_protocol::{ChannelId, GuildId, MessageEvent, MessageId, ReactionEvent, UserId};
use bl_router::{ReactionOutcome, RouteOutcome, Router};
use bl_store::{MockRowStore, RowStore};

pub const PREFIX: &str = "/";
pub const CHANNEL: ChannelId = ChannelId(500);
pub const GUILD: GuildId = GuildId(900);
pub const ALICE: UserId = UserId(11);
pub const BOB: UserId = UserId(22);

/// Classifier whose answer the test sets ahead of each message.
#[derive(Default)]
pub struct ScriptedClassifier {
    scores: Mutex<Option<Vec<ClassificationResult>>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedClassifier {
    /// Answer every following message with these scores.
    pub fn answer(&self, scores: &[(&str, f64)]) {
        *self.scores.lock().unwrap() = Some(
            scores
                .iter()
                .map(|(label, confidence)| ClassificationResult::new(*label, *confidence))
                .collect(),
        );
    }

    /// Fail every following classification.
    pub fn go_offline(&self) {
        *self.scores.lock().unwrap() = None;
    }

    /// Texts classified so far.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ClassifierGateway for ScriptedClassifier {
    async fn classify(&self, text: &str) -> ClassifierResult<Vec<ClassificationResult>> {
        self.calls.lock().unwrap().push(text.to_string());
        self.scores
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| ClassificationError::Unavailable("scripted outage".into()))
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// End-to-end harness: one bot, one chat channel, mocked edges.
pub struct TestHarness {
    pub transport: Arc<MockTransport>,
    pub store: Arc<MockRowStore>,
    pub model: Arc<UtteranceModel>,
    pub classifier: Arc<ScriptedClassifier>,
    pub state: SharedState,
    pub bot: Bot,
    next_message: Mutex<u64>,
}

impl TestHarness {
    /// Full feature set, scripted classifier, no channel filter.
    pub fn new() -> Self {
        Self::build(sample_model(), ChannelFilter::default(), true)
    }

    /// Same as `new`, but intents are classified by the utterance model itself.
    pub fn with_model_classifier() -> Self {
        Self::build(sample_model(), ChannelFilter::default(), false)
    }

    /// Harness answering only in the given guild.
    pub fn restricted_to(guild: GuildId) -> Self {
        let filter = ChannelFilter {
            guilds: [guild].into_iter().collect(),
            channels: Default::default(),
        };
        Self::build(sample_model(), filter, true)
    }

    /// Harness whose utterance model persists to `path`.
    pub fn with_model_file(path: &std::path::Path) -> Self {
        let model = UtteranceModel::load(path).unwrap();
        Self::build(model, ChannelFilter::default(), false)
    }

    fn build(model: UtteranceModel, filter: ChannelFilter, scripted: bool) -> Self {
        let transport = Arc::new(MockTransport::new());
        let store = Arc::new(MockRowStore::new());
        let model = Arc::new(model);
        let classifier = Arc::new(ScriptedClassifier::default());
        let state: SharedState = Arc::new(BotState::with_settings(
            transport.clone(),
            PREFIX,
            ", ",
            true,
        ));

        let row_store: Arc<dyn RowStore> = store.clone();
        let registry = build_registry(&state, model.clone(), Some(row_store)).unwrap();
        let gateway: Arc<dyn ClassifierGateway> = if scripted {
            classifier.clone()
        } else {
            model.clone()
        };
        let router = Router::new(Arc::new(registry), gateway, PREFIX, 0.9);
        let bot = Bot::new(state.clone(), router, filter);

        Self {
            transport,
            store,
            model,
            classifier,
            state,
            bot,
            next_message: Mutex::new(1),
        }
    }

    /// A fresh guild message from `author`.
    pub fn message_from(&self, author: UserId, text: &str) -> MessageEvent {
        let mut next = self.next_message.lock().unwrap();
        let id = MessageId(*next);
        *next += 1;
        MessageEvent::new(id, CHANNEL, author, text).in_guild(GUILD)
    }

    /// Post `text` as Alice and run it through the bot.
    pub async fn say(&self, text: &str) -> (MessageEvent, Option<RouteOutcome>) {
        self.say_as(ALICE, text).await
    }

    pub async fn say_as(&self, author: UserId, text: &str) -> (MessageEvent, Option<RouteOutcome>) {
        let message = self.message_from(author, text);
        let outcome = self.bot.handle_message(&message).await;
        (message, outcome)
    }

    /// `user` reacts to `message_id` with `token`.
    pub async fn react(
        &self,
        message_id: MessageId,
        user: UserId,
        token: &str,
    ) -> Option<ReactionOutcome> {
        let reaction = ReactionEvent::new(message_id, CHANNEL, user, token);
        self.bot.handle_reaction(&reaction).await
    }

    /// Id the bot's most recent message was given.
    pub fn last_sent_id(&self) -> MessageId {
        self.transport.sent().last().map(|(_, id)| *id).unwrap()
    }
}

pub fn sample_intents() -> Vec<IntentUtterances> {
    vec![
        IntentUtterances::new("greeting", &["hello", "hi there", "good morning"]),
        IntentUtterances::new("farewell", &["bye", "see you later"]),
        IntentUtterances::new("headpat", &["pat pat", "good bot"]),
        IntentUtterances::new(
            "genshin_mine",
            &["whose world can i mine", "is anyone ready to mine"],
        ),
    ]
}

pub fn sample_model() -> UtteranceModel {
    UtteranceModel::from_intents(sample_intents())
}
