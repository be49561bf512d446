// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Command channel: telemetry out, actuator commands in.
//!
//! Outbound publishing is fire-and-forget through the [`Publisher`] trait.
//! Inbound messages are decoded by [`handle_inbound`] and applied to the
//! shared [`DeviceContext`]. The broker transport lives in [`mqtt`].

mod mqtt;

pub use mqtt::MqttChannel;

use ds_core::{flag, Command, Feed};

use crate::context::{ActuatorState, DeviceContext};

/// Largest MQTT packet sent or accepted by the broker transport.
pub const MAX_PACKET_SIZE: usize = 512 * 1024;

/// Largest publish payload that fits in one packet with room for the topic
/// and fixed header.
pub const MAX_PAYLOAD_SIZE: usize = MAX_PACKET_SIZE - 1024;

/// Outbound side of the command channel.
///
/// Implementations never block and never fail: a message that cannot be
/// delivered is logged and dropped.
pub trait Publisher: Send + Sync {
    fn publish(&self, feed: Feed, value: &str);
}

/// Publisher used when no broker is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullPublisher;

impl Publisher for NullPublisher {
    fn publish(&self, feed: Feed, value: &str) {
        tracing::trace!(feed = feed.internal_name(), value, "no broker configured, dropping");
    }
}

/// Publish light and alarm status.
pub fn publish_alert_status(publisher: &dyn Publisher, state: ActuatorState) {
    publisher.publish(Feed::LedStatus, flag(state.led));
    publisher.publish(Feed::BuzzerStatus, flag(state.buzzer));
}

/// Decode an inbound message and apply it to the device.
///
/// Unknown topics and malformed payloads are logged and discarded. Returns
/// the applied command, if any.
pub fn handle_inbound(ctx: &DeviceContext, topic: &str, payload: &[u8]) -> Option<Command> {
    let feed = match Feed::from_topic(topic) {
        Ok(feed) => feed,
        Err(e) => {
            tracing::warn!(topic, error = %e, "ignoring message on unknown topic");
            return None;
        }
    };

    match Command::parse(feed, payload) {
        Ok(command) => {
            tracing::info!(feed = feed.internal_name(), on = command.is_on(), "command received");
            ctx.apply(command);
            Some(command)
        }
        Err(e) => {
            tracing::warn!(feed = feed.internal_name(), error = %e, "discarding inbound message");
            None
        }
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
