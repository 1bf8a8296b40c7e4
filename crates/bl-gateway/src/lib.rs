//! Chat transport for the Baselard bot.
//!
//! Provides the outbound side the router's handlers talk to and the
//! inbound classification the event loop dispatches on:
//! - `Transport` trait for send/edit/react/typing (mockable in tests)
//! - `MqttTransport` speaking to a chat bridge over MQTT (optionally mTLS)
//! - `MockTransport` for testing without a broker
//! - `IncomingEvent` classification of raw publishes

pub mod config;
pub mod error;
pub mod handler;
pub mod mock;
pub mod tls;
pub mod transport;

// Re-exports for convenience.
pub use config::MqttConfig;
pub use error::{GatewayError, GatewayResult};
pub use handler::{IncomingEvent, classify};
pub use mock::{MockTransport, OutboundCall};
pub use transport::{MqttTransport, Transport};
