//! MQTT topic builders and parsers for the chat bridge.
//!
//! Topic structure:
//! ```text
//! chat/{bot_id}/inbound/message
//! chat/{bot_id}/inbound/reaction
//! chat/{bot_id}/inbound/ack
//! chat/{bot_id}/outbound/send
//! chat/{bot_id}/outbound/edit
//! chat/{bot_id}/outbound/react
//! chat/{bot_id}/outbound/typing
//! ```

const PREFIX: &str = "chat";

// ─── Inbound (bridge → bot) ───

pub fn inbound_message(bot_id: &str) -> String {
    format!("{PREFIX}/{bot_id}/inbound/message")
}

pub fn inbound_reaction(bot_id: &str) -> String {
    format!("{PREFIX}/{bot_id}/inbound/reaction")
}

pub fn inbound_ack(bot_id: &str) -> String {
    format!("{PREFIX}/{bot_id}/inbound/ack")
}

/// Subscription filter covering every inbound topic for one bot.
pub fn inbound_all(bot_id: &str) -> String {
    format!("{PREFIX}/{bot_id}/inbound/+")
}

// ─── Outbound (bot → bridge) ───

pub fn outbound_send(bot_id: &str) -> String {
    format!("{PREFIX}/{bot_id}/outbound/send")
}

pub fn outbound_edit(bot_id: &str) -> String {
    format!("{PREFIX}/{bot_id}/outbound/edit")
}

pub fn outbound_react(bot_id: &str) -> String {
    format!("{PREFIX}/{bot_id}/outbound/react")
}

pub fn outbound_typing(bot_id: &str) -> String {
    format!("{PREFIX}/{bot_id}/outbound/typing")
}

// ─── Topic parsing ───

/// Which way a topic flows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Inbound,
    Outbound,
}

/// Parsed topic components.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTopic {
    pub bot_id: String,
    pub direction: Direction,
    pub kind: String,
}

/// Parse a topic string into its components.
/// Returns `None` if the topic doesn't match `chat/{bot_id}/{direction}/{kind}`.
pub fn parse_topic(topic: &str) -> Option<ParsedTopic> {
    let parts: Vec<&str> = topic.split('/').collect();

    if parts.len() != 4 || parts[0] != PREFIX || parts[1].is_empty() || parts[3].is_empty() {
        return None;
    }

    let direction = match parts[2] {
        "inbound" => Direction::Inbound,
        "outbound" => Direction::Outbound,
        _ => return None,
    };

    Some(ParsedTopic {
        bot_id: parts[1].to_string(),
        direction,
        kind: parts[3].to_string(),
    })
}
