//! MQTT event loop driver and inbound event dispatcher.
//!
//! Drives the rumqttc event loop, classifies incoming publishes and hands
//! each message or reaction to the `Bot` on its own task. Handlers await
//! send acknowledgements that arrive through this same loop, so handling
//! must never block polling.

use std::sync::Arc;
use std::time::Duration;

use rumqttc::{Event, EventLoop, Packet};

use bl_gateway::{IncomingEvent, MqttTransport, classify};

use crate::bot::Bot;

const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Drive the MQTT event loop and dispatch inbound events.
///
/// Runs forever. Subscriptions are (re)issued on every ConnAck so a
/// broker reconnect does not silently drop them.
pub async fn run(mut eventloop: EventLoop, transport: Arc<MqttTransport>, bot: Arc<Bot>) {
    tracing::info!(bot_id = transport.bot_id(), "event loop started");

    loop {
        match eventloop.poll().await {
            Ok(Event::Incoming(Packet::Publish(publish))) => {
                dispatch(classify(&publish), &transport, &bot);
            }
            Ok(Event::Incoming(Packet::ConnAck(_))) => {
                tracing::info!("connected to chat bridge broker");
                let transport = transport.clone();
                tokio::spawn(async move {
                    if let Err(e) = transport.subscribe_inbound().await {
                        tracing::error!(error = %e, "failed to subscribe to inbound topics");
                    }
                });
            }
            Ok(_) => {} // SubAck, PingResp, outgoing, etc.
            Err(e) => {
                tracing::error!(error = %e, "MQTT event loop error, reconnecting in 5s");
                tokio::time::sleep(RECONNECT_DELAY).await;
            }
        }
    }
}

/// Route one classified event. Acks complete in place; messages and
/// reactions are handled on spawned tasks.
pub fn dispatch(event: IncomingEvent, transport: &MqttTransport, bot: &Arc<Bot>) {
    match event {
        IncomingEvent::SendAck(ack) => {
            if !transport.complete_send(ack) {
                tracing::debug!(request_id = %ack.request_id, "ack for unknown or expired send");
            }
        }
        IncomingEvent::Message(message) => {
            let bot = bot.clone();
            tokio::spawn(async move {
                bot.handle_message(&message).await;
            });
        }
        IncomingEvent::Reaction(reaction) => {
            let bot = bot.clone();
            tokio::spawn(async move {
                bot.handle_reaction(&reaction).await;
            });
        }
        IncomingEvent::Unknown { topic, .. } => {
            tracing::debug!(topic = %topic, "ignoring unrecognized publish");
        }
    }
}
