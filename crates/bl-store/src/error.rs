//! Row-store error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("query error: {0}")]
    Query(String),

    #[error("cannot decode column \"{column}\" of type {type_name}")]
    Decode { column: String, type_name: String },

    #[error("{0}")]
    Other(String),
}

/// Convenience alias for row-store results.
pub type StoreResult<T> = Result<T, StoreError>;
