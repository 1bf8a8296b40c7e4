//! Gateway error types.

use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur while talking to the chat bridge.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("publish error: {0}")]
    Publish(String),

    #[error("subscribe error: {0}")]
    Subscribe(String),

    #[error("TLS error: {0}")]
    Tls(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("no ack for send request {request_id} after {timeout_ms}ms")]
    Timeout { request_id: Uuid, timeout_ms: u64 },

    #[error("send request {0} was dropped before it was acknowledged")]
    Dropped(Uuid),

    #[error("{0}")]
    Other(String),
}

/// Convenience alias for gateway results.
pub type GatewayResult<T> = Result<T, GatewayError>;
