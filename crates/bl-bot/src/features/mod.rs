//! Feature handlers and their registration.

pub mod basic;
pub mod genshin;
pub mod nlp;
pub mod utility;

use std::sync::Arc;

use bl_classifier::UtteranceModel;
use bl_router::{RegistrationError, Registry};
use bl_store::RowStore;

use crate::state::SharedState;

/// Register every feature. Help lists commands in this order.
///
/// Without a row store the Genshin mining feature is left out.
pub fn build_registry(
    state: &SharedState,
    model: Arc<UtteranceModel>,
    store: Option<Arc<dyn RowStore>>,
) -> Result<Registry, RegistrationError> {
    let mut registry = Registry::new();

    utility::register_all(&mut registry, state)?;
    nlp::register_all(&mut registry, state, model)?;
    match store {
        Some(store) => genshin::register_all(&mut registry, state, store)?,
        None => tracing::info!("no database configured, mining feature disabled"),
    }
    basic::register_all(&mut registry, state)?;

    tracing::info!(
        commands = registry.command_count(),
        intents = registry.intent_count(),
        "handlers registered"
    );
    Ok(registry)
}
