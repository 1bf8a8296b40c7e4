//! Outbound chat transport.
//!
//! `Transport` is the surface handlers use to talk back to the chat
//! platform. `MqttTransport` implements it against a chat bridge that
//! relays between the platform and MQTT topics (see `bl_protocol::topics`).

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use rumqttc::{AsyncClient, EventLoop, MqttOptions, QoS};
use serde::Serialize;
use tokio::sync::oneshot;
use uuid::Uuid;

use bl_protocol::{
    ChannelId, EditRequest, Embed, MessageId, OutboundMessage, ReactRequest, ReactionToken,
    SendAck, TypingRequest, topics,
};

use crate::config::MqttConfig;
use crate::error::{GatewayError, GatewayResult};
use crate::tls;

// ── Transport trait ───────────────────────────────────────────

/// Outbound operations against the chat platform.
///
/// Enables mocking in tests without a real bridge.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Post a message and return the id the platform assigned to it.
    async fn send(&self, message: OutboundMessage) -> GatewayResult<MessageId>;

    /// Replace the embed of a message the bot sent earlier.
    async fn edit(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
        embed: Embed,
    ) -> GatewayResult<()>;

    /// Add a reaction to a message.
    async fn react(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
        token: ReactionToken,
    ) -> GatewayResult<()>;

    /// Show the typing indicator in a channel.
    async fn typing(&self, channel_id: ChannelId) -> GatewayResult<()>;

    /// Most recent measured round trip to the platform.
    fn latency(&self) -> Duration;
}

// ── MqttTransport ─────────────────────────────────────────────

/// Transport speaking to the chat bridge over MQTT.
///
/// Owns the `AsyncClient` for publishing/subscribing. The `EventLoop`
/// is returned separately from `new()`; the caller must drive it and feed
/// `SendAck` events back through [`MqttTransport::complete_send`].
pub struct MqttTransport {
    client: AsyncClient,
    bot_id: String,
    send_timeout: Duration,
    /// Sends waiting for their bridge acknowledgement, keyed by request id.
    pending: Mutex<HashMap<Uuid, (Instant, oneshot::Sender<MessageId>)>>,
    last_rtt_ms: AtomicU64,
}

impl MqttTransport {
    /// Create a transport with TLS (production mode).
    pub fn new(config: &MqttConfig) -> GatewayResult<(Self, EventLoop)> {
        let mut options =
            MqttOptions::new(&config.client_id, &config.broker_host, config.broker_port);
        options.set_keep_alive(Duration::from_secs(config.keepalive_secs.into()));
        options.set_transport(tls::load_tls_transport(config)?);

        let (client, eventloop) = AsyncClient::new(options, 64);
        Ok((
            Self::from_client(
                client,
                &config.bot_id,
                Duration::from_secs(config.send_timeout_secs),
            ),
            eventloop,
        ))
    }

    /// Create a transport for local development (no TLS).
    pub fn new_plaintext(config: &MqttConfig) -> (Self, EventLoop) {
        let mut options =
            MqttOptions::new(&config.client_id, &config.broker_host, config.broker_port);
        options.set_keep_alive(Duration::from_secs(config.keepalive_secs.into()));

        let (client, eventloop) = AsyncClient::new(options, 64);
        (
            Self::from_client(
                client,
                &config.bot_id,
                Duration::from_secs(config.send_timeout_secs),
            ),
            eventloop,
        )
    }

    fn from_client(client: AsyncClient, bot_id: &str, send_timeout: Duration) -> Self {
        Self {
            client,
            bot_id: bot_id.to_string(),
            send_timeout,
            pending: Mutex::new(HashMap::new()),
            last_rtt_ms: AtomicU64::new(0),
        }
    }

    pub fn bot_id(&self) -> &str {
        &self.bot_id
    }

    /// Subscribe to every inbound bridge topic for this bot.
    pub async fn subscribe_inbound(&self) -> GatewayResult<()> {
        self.client
            .subscribe(topics::inbound_all(&self.bot_id), QoS::AtLeastOnce)
            .await
            .map_err(|e| GatewayError::Subscribe(e.to_string()))
    }

    /// Hand a bridge acknowledgement to the matching in-flight `send`.
    ///
    /// Returns `false` when no send is waiting for this request id
    /// (already timed out, or an ack for another process).
    pub fn complete_send(&self, ack: SendAck) -> bool {
        let waiter = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&ack.request_id);

        match waiter {
            Some((started, tx)) => {
                let rtt = started.elapsed().as_millis() as u64;
                self.last_rtt_ms.store(rtt, Ordering::Relaxed);
                tx.send(ack.message_id).is_ok()
            }
            None => false,
        }
    }

    /// Number of sends still waiting for an acknowledgement.
    pub fn pending_sends(&self) -> usize {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn forget(&self, request_id: &Uuid) {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(request_id);
    }

    async fn publish_json<T: Serialize>(&self, topic: &str, payload: &T) -> GatewayResult<()> {
        let bytes =
            serde_json::to_vec(payload).map_err(|e| GatewayError::Serialization(e.to_string()))?;
        self.client
            .publish(topic, QoS::AtLeastOnce, false, bytes)
            .await
            .map_err(|e| GatewayError::Publish(e.to_string()))
    }
}

#[async_trait]
impl Transport for MqttTransport {
    async fn send(&self, message: OutboundMessage) -> GatewayResult<MessageId> {
        let request_id = message.request_id;
        let (tx, rx) = oneshot::channel();
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(request_id, (Instant::now(), tx));

        let topic = topics::outbound_send(&self.bot_id);
        if let Err(e) = self.publish_json(&topic, &message).await {
            self.forget(&request_id);
            return Err(e);
        }

        match tokio::time::timeout(self.send_timeout, rx).await {
            Ok(Ok(message_id)) => Ok(message_id),
            Ok(Err(_)) => Err(GatewayError::Dropped(request_id)),
            Err(_) => {
                self.forget(&request_id);
                Err(GatewayError::Timeout {
                    request_id,
                    timeout_ms: self.send_timeout.as_millis() as u64,
                })
            }
        }
    }

    async fn edit(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
        embed: Embed,
    ) -> GatewayResult<()> {
        let request = EditRequest {
            channel_id,
            message_id,
            embed,
        };
        self.publish_json(&topics::outbound_edit(&self.bot_id), &request)
            .await
    }

    async fn react(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
        token: ReactionToken,
    ) -> GatewayResult<()> {
        let request = ReactRequest {
            channel_id,
            message_id,
            token,
        };
        self.publish_json(&topics::outbound_react(&self.bot_id), &request)
            .await
    }

    async fn typing(&self, channel_id: ChannelId) -> GatewayResult<()> {
        self.publish_json(
            &topics::outbound_typing(&self.bot_id),
            &TypingRequest { channel_id },
        )
        .await
    }

    fn latency(&self) -> Duration {
        Duration::from_millis(self.last_rtt_ms.load(Ordering::Relaxed))
    }
}
