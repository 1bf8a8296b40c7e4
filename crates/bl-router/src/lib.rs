//! Message routing core for the Baselard bot.
//!
//! An incoming message goes to the command dispatcher first; when it does
//! not carry the command prefix, the intent dispatcher asks the classifier
//! for the best intent and invokes that intent's handler if the confidence
//! clears the threshold. Handlers may park a reaction-gated confirmation on
//! a message they sent; reaction events resolve it exactly once.

pub mod command;
pub mod confirmation;
pub mod error;
pub mod handler;
pub mod intent;
pub mod registry;
pub mod router;

pub use command::{CommandDispatcher, CommandOutcome, ParsedCommand};
pub use confirmation::{
    ConfirmationEngine, ConfirmationEntry, Continuation, FnContinuation, ReactionOutcome,
};
pub use error::{DispatchError, DuplicateConfirmationError, RegistrationError};
pub use handler::{
    CommandHandler, CommandInvocation, HandlerDescriptor, IntentDescriptor, IntentHandler,
    IntentInvocation,
};
pub use intent::{DEFAULT_CONFIDENCE_THRESHOLD, IntentDispatcher, IntentOutcome};
pub use registry::Registry;
pub use router::{RouteOutcome, Router};
