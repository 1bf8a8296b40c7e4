//! Classifier error types.

use thiserror::Error;

/// Errors produced by a classifier or by model administration.
#[derive(Debug, Error)]
pub enum ClassificationError {
    #[error("model has no trained intents")]
    Untrained,

    #[error("classifier unavailable: {0}")]
    Unavailable(String),

    #[error("malformed classifier output: {0}")]
    Malformed(String),

    #[error("unknown intent \"{0}\"")]
    UnknownIntent(String),

    #[error("intent \"{label}\" already has utterance \"{utterance}\"")]
    DuplicateUtterance { label: String, utterance: String },

    #[error("utterance must contain at least one word")]
    EmptyUtterance,

    #[error("I/O error: {0}")]
    Io(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Convenience alias for classifier results.
pub type ClassifierResult<T> = Result<T, ClassificationError>;
