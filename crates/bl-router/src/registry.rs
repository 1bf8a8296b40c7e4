//! Handler registry.
//!
//! Commands are indexed by name and by alias for O(1) dispatch. Intent
//! handlers are indexed by label. Both tables remember registration order,
//! which drives help listings and the intent tie-break.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::error::RegistrationError;
use crate::handler::{CommandHandler, HandlerDescriptor, IntentDescriptor, IntentHandler};

/// Name- and label-indexed handler tables.
///
/// Populated once at startup, then shared read-only behind an `Arc`.
#[derive(Default)]
pub struct Registry {
    commands: Vec<Arc<dyn CommandHandler>>,
    /// Command name → index into `commands`.
    names: HashMap<String, usize>,
    /// Command alias → index into `commands`.
    aliases: HashMap<String, usize>,
    intents: Vec<Arc<dyn IntentHandler>>,
    /// Intent label → index into `intents`.
    labels: HashMap<String, usize>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a command handler.
    ///
    /// Fails without touching the registry if the name or any alias is
    /// already claimed, including by the handler's own name or aliases.
    pub fn register_command(
        &mut self,
        handler: Arc<dyn CommandHandler>,
    ) -> Result<(), RegistrationError> {
        let descriptor = handler.descriptor();
        let mut claimed: HashSet<&str> = HashSet::new();

        for token in descriptor.tokens() {
            if let Some(owner) = self.owner_of(token) {
                return Err(RegistrationError::DuplicateHandler {
                    claim: token.to_string(),
                    command: descriptor.name.clone(),
                    owner: owner.to_string(),
                });
            }
            if !claimed.insert(token) {
                return Err(RegistrationError::DuplicateHandler {
                    claim: token.to_string(),
                    command: descriptor.name.clone(),
                    owner: descriptor.name.clone(),
                });
            }
        }

        let index = self.commands.len();
        self.names.insert(descriptor.name.clone(), index);
        for alias in &descriptor.aliases {
            self.aliases.insert(alias.clone(), index);
        }
        tracing::debug!(command = %descriptor.name, aliases = ?descriptor.aliases, "registered command");
        self.commands.push(handler);
        Ok(())
    }

    /// Add an intent handler. Fails if the label is already registered.
    pub fn register_intent(
        &mut self,
        handler: Arc<dyn IntentHandler>,
    ) -> Result<(), RegistrationError> {
        let label = handler.descriptor().label.clone();
        if self.labels.contains_key(&label) {
            return Err(RegistrationError::DuplicateIntent { label });
        }

        tracing::debug!(intent = %label, "registered intent handler");
        self.labels.insert(label, self.intents.len());
        self.intents.push(handler);
        Ok(())
    }

    /// Look up a command by exact token: names first, then aliases.
    pub fn resolve_command(&self, token: &str) -> Option<&Arc<dyn CommandHandler>> {
        self.names
            .get(token)
            .or_else(|| self.aliases.get(token))
            .map(|&i| &self.commands[i])
    }

    pub fn resolve_intent(&self, label: &str) -> Option<&Arc<dyn IntentHandler>> {
        self.labels.get(label).map(|&i| &self.intents[i])
    }

    /// Registration position of an intent label.
    pub fn intent_order(&self, label: &str) -> Option<usize> {
        self.labels.get(label).copied()
    }

    /// Command descriptors in registration order.
    pub fn list_commands(&self) -> Vec<&HandlerDescriptor> {
        self.commands.iter().map(|c| c.descriptor()).collect()
    }

    /// Intent descriptors in registration order.
    pub fn list_intents(&self) -> Vec<&IntentDescriptor> {
        self.intents.iter().map(|i| i.descriptor()).collect()
    }

    pub fn command_count(&self) -> usize {
        self.commands.len()
    }

    pub fn intent_count(&self) -> usize {
        self.intents.len()
    }

    fn owner_of(&self, token: &str) -> Option<&str> {
        self.names
            .get(token)
            .or_else(|| self.aliases.get(token))
            .map(|&i| self.commands[i].descriptor().name.as_str())
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field(
                "commands",
                &self.list_commands().iter().map(|d| &d.name).collect::<Vec<_>>(),
            )
            .field(
                "intents",
                &self.list_intents().iter().map(|d| &d.label).collect::<Vec<_>>(),
            )
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::handler::{CommandInvocation, IntentInvocation};
    use async_trait::async_trait;

    pub(crate) struct StubCommand(pub HandlerDescriptor);

    #[async_trait]
    impl CommandHandler for StubCommand {
        fn descriptor(&self) -> &HandlerDescriptor {
            &self.0
        }

        async fn on_command(&self, _invocation: CommandInvocation<'_>) -> anyhow::Result<()> {
            Ok(())
        }
    }

    pub(crate) struct StubIntent(pub IntentDescriptor);

    #[async_trait]
    impl IntentHandler for StubIntent {
        fn descriptor(&self) -> &IntentDescriptor {
            &self.0
        }

        async fn on_intent_detected(&self, _invocation: IntentInvocation<'_>) -> anyhow::Result<()> {
            Ok(())
        }
    }

    fn command(name: &str, aliases: &[&str]) -> Arc<dyn CommandHandler> {
        Arc::new(StubCommand(HandlerDescriptor::new(name, "stub").aliases(aliases)))
    }

    fn intent(label: &str) -> Arc<dyn IntentHandler> {
        Arc::new(StubIntent(IntentDescriptor::new(label, "stub")))
    }

    #[test]
    fn resolves_by_name_and_alias() {
        let mut registry = Registry::new();
        registry.register_command(command("help", &["?"])).unwrap();

        assert_eq!(registry.resolve_command("help").unwrap().descriptor().name, "help");
        assert_eq!(registry.resolve_command("?").unwrap().descriptor().name, "help");
        assert!(registry.resolve_command("Help").is_none());
        assert!(registry.resolve_command("hel").is_none());
    }

    #[test]
    fn name_collision_is_rejected() {
        let mut registry = Registry::new();
        registry.register_command(command("ping", &[])).unwrap();

        let err = registry.register_command(command("ping", &["p"])).unwrap_err();
        assert_eq!(
            err,
            RegistrationError::DuplicateHandler {
                claim: "ping".into(),
                command: "ping".into(),
                owner: "ping".into(),
            }
        );
        assert_eq!(registry.command_count(), 1);
        assert!(registry.resolve_command("p").is_none());
    }

    #[test]
    fn alias_colliding_with_existing_name_is_rejected() {
        let mut registry = Registry::new();
        registry.register_command(command("test", &[])).unwrap();

        let err = registry
            .register_command(command("toggle", &["t", "test"]))
            .unwrap_err();
        assert!(matches!(
            err,
            RegistrationError::DuplicateHandler { ref claim, ref owner, .. }
                if claim == "test" && owner == "test"
        ));
        // Nothing from the failed registration leaks in.
        assert!(registry.resolve_command("toggle").is_none());
        assert!(registry.resolve_command("t").is_none());
    }

    #[test]
    fn name_colliding_with_existing_alias_is_rejected() {
        let mut registry = Registry::new();
        registry.register_command(command("toggle", &["t"])).unwrap();

        assert!(registry.register_command(command("t", &[])).is_err());
    }

    #[test]
    fn alias_equal_to_own_name_is_rejected() {
        let mut registry = Registry::new();
        let err = registry
            .register_command(command("mine", &["mining", "mine"]))
            .unwrap_err();
        assert!(matches!(err, RegistrationError::DuplicateHandler { .. }));
        assert_eq!(registry.command_count(), 0);
    }

    #[test]
    fn commands_list_in_registration_order() {
        let mut registry = Registry::new();
        for name in ["help", "ping", "test", "toggle"] {
            registry.register_command(command(name, &[])).unwrap();
        }
        let names: Vec<_> = registry
            .list_commands()
            .iter()
            .map(|d| d.name.as_str())
            .collect();
        assert_eq!(names, ["help", "ping", "test", "toggle"]);
    }

    #[test]
    fn duplicate_intent_label_is_rejected() {
        let mut registry = Registry::new();
        registry.register_intent(intent("greeting")).unwrap();

        let err = registry.register_intent(intent("greeting")).unwrap_err();
        assert_eq!(
            err,
            RegistrationError::DuplicateIntent {
                label: "greeting".into()
            }
        );
        assert_eq!(registry.intent_count(), 1);
    }

    #[test]
    fn intent_order_follows_registration() {
        let mut registry = Registry::new();
        registry.register_intent(intent("greeting")).unwrap();
        registry.register_intent(intent("farewell")).unwrap();

        assert_eq!(registry.intent_order("greeting"), Some(0));
        assert_eq!(registry.intent_order("farewell"), Some(1));
        assert_eq!(registry.intent_order("headpat"), None);
        assert!(registry.resolve_intent("farewell").is_some());
    }

    #[test]
    fn command_and_intent_tables_are_independent() {
        let mut registry = Registry::new();
        registry.register_command(command("mine", &["mining"])).unwrap();
        registry.register_intent(intent("mine")).unwrap();

        assert!(registry.resolve_command("mine").is_some());
        assert!(registry.resolve_intent("mine").is_some());
    }
}
