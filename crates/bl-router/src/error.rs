//! Routing error taxonomy.
//!
//! Only `RegistrationError` is meant to stop the process (at startup).
//! Everything else is scoped to a single message or reaction.

use bl_protocol::MessageId;
use thiserror::Error;

/// A handler tried to claim a name, alias, or label someone else owns.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistrationError {
    #[error("\"{claim}\" of command \"{command}\" is already claimed by \"{owner}\"")]
    DuplicateHandler {
        claim: String,
        command: String,
        owner: String,
    },

    #[error("intent \"{label}\" is already registered")]
    DuplicateIntent { label: String },
}

/// A handler returned an error while handling one message.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("command \"{command}\" failed: {cause:#}")]
    Command {
        command: String,
        cause: anyhow::Error,
    },

    #[error("intent \"{label}\" failed: {cause:#}")]
    Intent { label: String, cause: anyhow::Error },
}

/// A confirmation is already pending on this message.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("a confirmation is already pending on message {message_id}")]
pub struct DuplicateConfirmationError {
    pub message_id: MessageId,
}
