// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Operator commands sent over the command channel.
//!
//! The CLI opens a publish-only channel, sends one value on a command feed,
//! and disconnects. The running agent receives it like any remote command.

use ds_core::{flag, Feed};
use tokio_util::sync::CancellationToken;

use crate::channel::{MqttChannel, Publisher};
use crate::config::Config;
use crate::error::{Error, Result};

pub async fn run(config: &Config, feed: Feed, on: bool) -> Result<()> {
    if !config.mqtt.is_configured() {
        return Err(Error::Config(
            "mqtt.username and mqtt.key are required to send commands".to_string(),
        ));
    }

    let cancel = CancellationToken::new();
    let channel = MqttChannel::connect(&config.mqtt, None, cancel.clone()).await;
    let sent = send(&channel, channel.is_connected(), feed, on);
    channel.close().await;
    cancel.cancel();

    println!("{}", sent?);
    Ok(())
}

/// Publish one command value. Returns a confirmation line.
pub(crate) fn send(publisher: &dyn Publisher, connected: bool, feed: Feed, on: bool) -> Result<String> {
    if !feed.is_command() {
        return Err(ds_core::Error::NotACommandFeed(feed.internal_name().to_string()).into());
    }
    if !connected {
        return Err(Error::Channel("broker not reachable, command not sent".to_string()));
    }
    publisher.publish(feed, flag(on));
    Ok(format!(
        "Sent {} = {}",
        feed.wire_name(),
        if on { "on" } else { "off" }
    ))
}

#[cfg(test)]
#[path = "control_tests.rs"]
mod tests;
