//! Small-talk intents answered with a random canned line.

use std::sync::Arc;

use async_trait::async_trait;
use rand::seq::SliceRandom;

use bl_router::{IntentDescriptor, IntentHandler, IntentInvocation, RegistrationError, Registry};

use crate::state::SharedState;

pub const GREETINGS: &[&str] = &[
    "Hello there",
    "Howdy",
    "You are in the presence of the great genius Baselard, state your purpose!",
    "Ohayou gozaimasu~",
];

pub const FAREWELLS: &[&str] = &[
    "See ya later",
    "Mata ne~",
    "Aww, give me a head pat before you go~",
];

pub const HEADPATS: &[&str] = &[
    "Fuwa fuwa~",
    "Mm, I like head pats",
    "Why am I always squinting? Because I don't want anyone to see my eyes. Nope, nobody~",
];

pub struct CannedReply {
    descriptor: IntentDescriptor,
    lines: &'static [&'static str],
    state: SharedState,
}

impl CannedReply {
    pub fn new(
        label: &str,
        description: &str,
        lines: &'static [&'static str],
        state: SharedState,
    ) -> Self {
        Self {
            descriptor: IntentDescriptor::new(label, description),
            lines,
            state,
        }
    }
}

#[async_trait]
impl IntentHandler for CannedReply {
    fn descriptor(&self) -> &IntentDescriptor {
        &self.descriptor
    }

    async fn on_intent_detected(&self, invocation: IntentInvocation<'_>) -> anyhow::Result<()> {
        let Some(line) = self.lines.choose(&mut rand::thread_rng()).copied() else {
            return Ok(());
        };
        self.state.typing(invocation.channel()).await?;
        self.state.reply(invocation.message, line).await?;
        Ok(())
    }
}

pub fn register_all(registry: &mut Registry, state: &SharedState) -> Result<(), RegistrationError> {
    let handlers = [
        CannedReply::new("greeting", "Basic greetings", GREETINGS, state.clone()),
        CannedReply::new("farewell", "Basic farewell", FAREWELLS, state.clone()),
        CannedReply::new("headpat", "I like to be given head pats!", HEADPATS, state.clone()),
    ];
    for handler in handlers {
        registry.register_intent(Arc::new(handler))?;
    }
    Ok(())
}
