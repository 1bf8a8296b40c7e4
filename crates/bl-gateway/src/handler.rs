//! Inbound event classification for the bot's event loop.
//!
//! Parses raw MQTT publishes into typed `IncomingEvent` variants
//! so the event loop can dispatch them without topic string matching.

use rumqttc::Publish;

use bl_protocol::topics::{self, Direction};
use bl_protocol::{MessageEvent, ReactionEvent, SendAck};

/// A classified inbound publish.
#[derive(Debug)]
pub enum IncomingEvent {
    /// A message posted in a visible channel.
    Message(MessageEvent),
    /// A reaction added to a message.
    Reaction(ReactionEvent),
    /// The bridge acknowledged one of our sends.
    SendAck(SendAck),
    /// Unrecognized topic or payload.
    Unknown { topic: String, payload: Vec<u8> },
}

/// Classify a raw MQTT publish into a typed event.
pub fn classify(publish: &Publish) -> IncomingEvent {
    classify_raw(&publish.topic, &publish.payload)
}

/// Classify a topic/payload pair.
pub fn classify_raw(topic: &str, payload: &[u8]) -> IncomingEvent {
    let unknown = || IncomingEvent::Unknown {
        topic: topic.to_string(),
        payload: payload.to_vec(),
    };

    let Some(parsed) = topics::parse_topic(topic) else {
        return unknown();
    };
    if parsed.direction != Direction::Inbound {
        return unknown();
    }

    match parsed.kind.as_str() {
        "message" => serde_json::from_slice(payload)
            .map(IncomingEvent::Message)
            .unwrap_or_else(|_| unknown()),
        "reaction" => serde_json::from_slice(payload)
            .map(IncomingEvent::Reaction)
            .unwrap_or_else(|_| unknown()),
        "ack" => serde_json::from_slice(payload)
            .map(IncomingEvent::SendAck)
            .unwrap_or_else(|_| unknown()),
        _ => unknown(),
    }
}
