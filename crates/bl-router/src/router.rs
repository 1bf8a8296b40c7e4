//! Two-stage message routing: commands first, then intents.

use std::sync::Arc;

use bl_classifier::ClassifierGateway;
use bl_protocol::MessageEvent;

use crate::command::{CommandDispatcher, CommandOutcome};
use crate::intent::{IntentDispatcher, IntentOutcome};
use crate::registry::Registry;

/// Where a message ended up.
#[derive(Debug)]
pub enum RouteOutcome {
    Command(CommandOutcome),
    Intent(IntentOutcome),
    /// Unprefixed, and natural-language chat is switched off.
    NlpDisabled,
}

pub struct Router {
    commands: CommandDispatcher,
    intents: IntentDispatcher,
}

impl Router {
    pub fn new(
        registry: Arc<Registry>,
        classifier: Arc<dyn ClassifierGateway>,
        prefix: impl Into<String>,
        threshold: f64,
    ) -> Self {
        Self {
            commands: CommandDispatcher::new(registry.clone(), prefix),
            intents: IntentDispatcher::new(registry, classifier, threshold),
        }
    }

    pub fn commands(&self) -> &CommandDispatcher {
        &self.commands
    }

    pub fn intents(&self) -> &IntentDispatcher {
        &self.intents
    }

    pub fn registry(&self) -> &Arc<Registry> {
        self.commands.registry()
    }

    /// Route one message. A prefixed message never reaches the classifier,
    /// whether or not its command exists.
    pub async fn route(&self, message: &MessageEvent, nlp_enabled: bool) -> RouteOutcome {
        match self.commands.dispatch(message).await {
            CommandOutcome::NoMatch if nlp_enabled => {
                RouteOutcome::Intent(self.intents.dispatch(message).await)
            }
            CommandOutcome::NoMatch => RouteOutcome::NlpDisabled,
            outcome => RouteOutcome::Command(outcome),
        }
    }
}
