// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! MQTT transport for the command channel.
//!
//! The rumqttc event loop runs in a background task. It reconnects on its
//! own after a transport error, re-subscribes to the command feeds on every
//! connection acknowledgement, and hands inbound publishes to
//! [`handle_inbound`](super::handle_inbound). Connection state is shared with
//! the publishing side through a `watch` channel.

use std::sync::Arc;
use std::time::Duration;

use ds_core::Feed;
use rand::Rng;
use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Outgoing, Packet, QoS, Transport};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::{handle_inbound, Publisher, MAX_PACKET_SIZE};
use crate::config::MqttConfig;
use crate::context::DeviceContext;

/// Capacity of the request queue between client and event loop.
const REQUEST_CAPACITY: usize = 64;
const KEEP_ALIVE: Duration = Duration::from_secs(30);
/// Delay before the event loop is polled again after a transport error.
const RECONNECT_DELAY: Duration = Duration::from_secs(5);
/// How long `close` waits for queued messages to leave.
pub(crate) const CLOSE_TIMEOUT: Duration = Duration::from_secs(3);

/// Random client id, so a restarted device never collides with its old
/// session.
pub(crate) fn client_id() -> String {
    format!("domisafe-{:05}", rand::thread_rng().gen_range(0..100_000))
}

pub(crate) fn mqtt_options(config: &MqttConfig, client_id: &str) -> MqttOptions {
    let mut options = MqttOptions::new(client_id, config.broker.clone(), config.port);
    options.set_credentials(config.username.clone(), config.key.clone());
    options.set_keep_alive(KEEP_ALIVE);
    options.set_max_packet_size(MAX_PACKET_SIZE, MAX_PACKET_SIZE);
    options.set_transport(Transport::tls_with_default_config());
    options
}

/// Broker connection used for publishing telemetry and, optionally,
/// receiving commands.
pub struct MqttChannel {
    client: AsyncClient,
    username: String,
    connected: watch::Receiver<bool>,
    event_loop: JoinHandle<()>,
}

impl MqttChannel {
    /// Open a channel and wait up to the configured timeout for the broker.
    ///
    /// When `inbound` is set the command feeds are subscribed and applied to
    /// that context; otherwise the channel is publish-only. On timeout the
    /// channel is returned disconnected and keeps reconnecting in the
    /// background; publishes are dropped until it succeeds.
    pub async fn connect(
        config: &MqttConfig,
        inbound: Option<Arc<DeviceContext>>,
        cancel: CancellationToken,
    ) -> MqttChannel {
        let client_id = client_id();
        let (client, eventloop) = AsyncClient::new(mqtt_options(config, &client_id), REQUEST_CAPACITY);
        let (state_tx, mut state_rx) = watch::channel(false);

        let event_loop = tokio::spawn(drive(
            eventloop,
            client.clone(),
            config.username.clone(),
            inbound,
            state_tx,
            cancel,
        ));

        let timeout = config.connect_timeout();
        match tokio::time::timeout(timeout, state_rx.wait_for(|connected| *connected)).await {
            Ok(Ok(_)) => {
                tracing::info!(broker = %config.broker, client_id = %client_id, "connected to broker");
            }
            Ok(Err(_)) => {
                tracing::warn!(broker = %config.broker, "broker event loop ended before connecting");
            }
            Err(_) => {
                tracing::warn!(
                    broker = %config.broker,
                    timeout_secs = timeout.as_secs(),
                    "broker not reachable, continuing disconnected"
                );
            }
        }

        MqttChannel {
            client,
            username: config.username.clone(),
            connected: state_rx,
            event_loop,
        }
    }

    pub fn is_connected(&self) -> bool {
        *self.connected.borrow()
    }

    /// Disconnect cleanly, giving queued publishes a chance to go out.
    ///
    /// Without a live session there is nothing to flush, so the event loop
    /// is stopped right away instead of waiting out a reconnect attempt.
    pub async fn close(mut self) {
        if !self.is_connected() {
            self.event_loop.abort();
            tracing::debug!("closed broker channel without a session");
            return;
        }
        if let Err(e) = self.client.disconnect().await {
            tracing::debug!(error = %e, "disconnect request not queued");
        }
        if tokio::time::timeout(CLOSE_TIMEOUT, &mut self.event_loop)
            .await
            .is_err()
        {
            tracing::warn!("broker event loop did not stop in time");
            self.event_loop.abort();
        }
    }
}

impl Publisher for MqttChannel {
    fn publish(&self, feed: Feed, value: &str) {
        if !self.is_connected() {
            tracing::debug!(feed = feed.internal_name(), "not connected, dropping publish");
            return;
        }
        let topic = feed.topic(&self.username);
        if let Err(e) = self
            .client
            .try_publish(topic, QoS::AtLeastOnce, false, value.as_bytes().to_vec())
        {
            tracing::warn!(feed = feed.internal_name(), error = %e, "publish failed");
        }
    }
}

/// Background task polling the rumqttc event loop until cancelled.
async fn drive(
    mut eventloop: EventLoop,
    client: AsyncClient,
    username: String,
    inbound: Option<Arc<DeviceContext>>,
    state: watch::Sender<bool>,
    cancel: CancellationToken,
) {
    loop {
        let event = tokio::select! {
            _ = cancel.cancelled() => break,
            event = eventloop.poll() => event,
        };

        match event {
            Ok(Event::Incoming(Packet::ConnAck(_))) => {
                state.send_replace(true);
                if inbound.is_some() {
                    subscribe_commands(&client, &username);
                }
            }
            Ok(Event::Incoming(Packet::Publish(publish))) => {
                if let Some(ctx) = &inbound {
                    handle_inbound(ctx, &publish.topic, &publish.payload);
                }
            }
            Ok(Event::Outgoing(Outgoing::Disconnect)) => {
                state.send_replace(false);
                break;
            }
            Ok(_) => {}
            Err(e) => {
                if state.send_replace(false) {
                    tracing::warn!(error = %e, "broker connection lost");
                } else {
                    tracing::debug!(error = %e, "broker connection attempt failed");
                }
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = tokio::time::sleep(RECONNECT_DELAY) => {}
                }
            }
        }
    }
    state.send_replace(false);
    tracing::debug!("broker event loop stopped");
}

fn subscribe_commands(client: &AsyncClient, username: &str) {
    for feed in Feed::COMMAND_FEEDS {
        if let Err(e) = client.try_subscribe(feed.topic(username), QoS::AtLeastOnce) {
            tracing::warn!(feed = feed.internal_name(), error = %e, "subscribe failed");
        }
    }
}

#[cfg(test)]
#[path = "mqtt_tests.rs"]
mod tests;
