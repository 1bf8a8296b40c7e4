//! Mock transport for testing without a chat bridge.
//!
//! Records every outbound call for assertion in tests and hands out
//! sequential message ids for sends.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use bl_protocol::{
    ChannelId, EditRequest, Embed, MessageId, OutboundMessage, ReactRequest, ReactionToken,
};

use crate::error::{GatewayError, GatewayResult};
use crate::transport::Transport;

/// First id handed out by `MockTransport::send`.
const FIRST_SENT_ID: u64 = 1_000;

/// A recorded outbound call.
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundCall {
    Send {
        message: OutboundMessage,
        assigned: MessageId,
    },
    Edit(EditRequest),
    React(ReactRequest),
    Typing(ChannelId),
}

/// Mock implementation of the `Transport` trait.
///
/// Thread-safe via `Mutex` (fine for test contexts).
pub struct MockTransport {
    calls: Mutex<Vec<OutboundCall>>,
    next_id: AtomicU64,
    fail_sends: AtomicBool,
    latency: Duration,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::with_latency(Duration::from_millis(42))
    }

    /// Mock reporting a fixed round-trip latency.
    pub fn with_latency(latency: Duration) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(FIRST_SENT_ID),
            fail_sends: AtomicBool::new(false),
            latency,
        }
    }

    /// Make subsequent `send` calls fail (edits and reactions still succeed).
    pub fn fail_sends(&self, fail: bool) {
        self.fail_sends.store(fail, Ordering::SeqCst);
    }

    /// All recorded calls in order.
    pub fn calls(&self) -> Vec<OutboundCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Messages sent, paired with the id each was assigned.
    pub fn sent(&self) -> Vec<(OutboundMessage, MessageId)> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter_map(|c| match c {
                OutboundCall::Send { message, assigned } => Some((message.clone(), *assigned)),
                _ => None,
            })
            .collect()
    }

    /// The last message sent, if any.
    pub fn last_sent(&self) -> Option<OutboundMessage> {
        self.sent().pop().map(|(message, _)| message)
    }

    /// All reactions added.
    pub fn reactions(&self) -> Vec<ReactRequest> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter_map(|c| match c {
                OutboundCall::React(r) => Some(r.clone()),
                _ => None,
            })
            .collect()
    }

    /// Reaction tokens added to one message, in order.
    pub fn reactions_on(&self, message_id: MessageId) -> Vec<ReactionToken> {
        self.reactions()
            .into_iter()
            .filter(|r| r.message_id == message_id)
            .map(|r| r.token)
            .collect()
    }

    /// All embed edits.
    pub fn edits(&self) -> Vec<EditRequest> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter_map(|c| match c {
                OutboundCall::Edit(e) => Some(e.clone()),
                _ => None,
            })
            .collect()
    }

    /// Clear all recorded state.
    pub fn reset(&self) {
        self.calls.lock().unwrap().clear();
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, message: OutboundMessage) -> GatewayResult<MessageId> {
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(GatewayError::Publish("mock send failure".into()));
        }
        let assigned = MessageId(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.calls
            .lock()
            .unwrap()
            .push(OutboundCall::Send { message, assigned });
        Ok(assigned)
    }

    async fn edit(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
        embed: Embed,
    ) -> GatewayResult<()> {
        self.calls.lock().unwrap().push(OutboundCall::Edit(EditRequest {
            channel_id,
            message_id,
            embed,
        }));
        Ok(())
    }

    async fn react(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
        token: ReactionToken,
    ) -> GatewayResult<()> {
        self.calls.lock().unwrap().push(OutboundCall::React(ReactRequest {
            channel_id,
            message_id,
            token,
        }));
        Ok(())
    }

    async fn typing(&self, channel_id: ChannelId) -> GatewayResult<()> {
        self.calls
            .lock()
            .unwrap()
            .push(OutboundCall::Typing(channel_id));
        Ok(())
    }

    fn latency(&self) -> Duration {
        self.latency
    }
}
