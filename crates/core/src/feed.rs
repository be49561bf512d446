// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Command channel feeds and inbound commands.
//!
//! Feed names use hyphens on the wire (`led-status`) and underscores
//! internally (`led_status`). [`Feed`] is the only place that translation
//! happens; both spellings parse back to the same variant.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// A named topic on the command channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feed {
    Temperature,
    Humidity,
    Motion,
    LedStatus,
    BuzzerStatus,
    MotorStatus,
    /// Base64-encoded JPEG of the last intrusion.
    CameraLastImage,
    SecurityEnabled,
}

impl Feed {
    pub const ALL: [Feed; 8] = [
        Feed::Temperature,
        Feed::Humidity,
        Feed::Motion,
        Feed::LedStatus,
        Feed::BuzzerStatus,
        Feed::MotorStatus,
        Feed::CameraLastImage,
        Feed::SecurityEnabled,
    ];

    /// Feeds the device subscribes to for remote control.
    pub const COMMAND_FEEDS: [Feed; 4] = [
        Feed::MotorStatus,
        Feed::LedStatus,
        Feed::BuzzerStatus,
        Feed::SecurityEnabled,
    ];

    /// Hyphenated name used in broker topics.
    pub fn wire_name(&self) -> &'static str {
        match self {
            Feed::Temperature => "temperature",
            Feed::Humidity => "humidity",
            Feed::Motion => "motion",
            Feed::LedStatus => "led-status",
            Feed::BuzzerStatus => "buzzer-status",
            Feed::MotorStatus => "motor-status",
            Feed::CameraLastImage => "camera-last-image",
            Feed::SecurityEnabled => "security-enabled",
        }
    }

    /// Underscored name used internally and in logs.
    pub fn internal_name(&self) -> &'static str {
        match self {
            Feed::Temperature => "temperature",
            Feed::Humidity => "humidity",
            Feed::Motion => "motion",
            Feed::LedStatus => "led_status",
            Feed::BuzzerStatus => "buzzer_status",
            Feed::MotorStatus => "motor_status",
            Feed::CameraLastImage => "camera_last_image",
            Feed::SecurityEnabled => "security_enabled",
        }
    }

    pub fn is_command(&self) -> bool {
        Self::COMMAND_FEEDS.contains(self)
    }

    /// Full broker topic for this feed under `username`.
    pub fn topic(&self, username: &str) -> String {
        format!("{username}/feeds/{}", self.wire_name())
    }

    /// Resolve the feed a broker topic refers to.
    ///
    /// Only the last path segment is considered, so `user/feeds/led-status`
    /// and a bare `led-status` both resolve to [`Feed::LedStatus`].
    pub fn from_topic(topic: &str) -> Result<Feed> {
        let name = topic.rsplit('/').next().unwrap_or(topic);
        name.parse()
    }
}

impl fmt::Display for Feed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.wire_name())
    }
}

impl FromStr for Feed {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_lowercase().replace('_', "-");
        Feed::ALL
            .into_iter()
            .find(|feed| feed.wire_name() == normalized)
            .ok_or_else(|| Error::UnknownFeed(s.to_string()))
    }
}

/// A remote control instruction received on a command feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    SetLed(bool),
    SetBuzzer(bool),
    SetMotor(bool),
    SetSecurity(bool),
}

impl Command {
    /// Decode an inbound payload on `feed`.
    ///
    /// Payloads are integers; `1` means on and any other integer means off.
    pub fn parse(feed: Feed, payload: &[u8]) -> Result<Command> {
        if !feed.is_command() {
            return Err(Error::NotACommandFeed(feed.wire_name().to_string()));
        }

        let text = String::from_utf8_lossy(payload);
        let value: i64 = text
            .trim()
            .parse()
            .map_err(|_| Error::MalformedPayload {
                feed: feed.wire_name().to_string(),
                payload: text.to_string(),
            })?;
        let on = value == 1;

        match feed {
            Feed::LedStatus => Ok(Command::SetLed(on)),
            Feed::BuzzerStatus => Ok(Command::SetBuzzer(on)),
            Feed::MotorStatus => Ok(Command::SetMotor(on)),
            Feed::SecurityEnabled => Ok(Command::SetSecurity(on)),
            other => Err(Error::NotACommandFeed(other.wire_name().to_string())),
        }
    }

    /// The feed this command is carried on.
    pub fn feed(&self) -> Feed {
        match self {
            Command::SetLed(_) => Feed::LedStatus,
            Command::SetBuzzer(_) => Feed::BuzzerStatus,
            Command::SetMotor(_) => Feed::MotorStatus,
            Command::SetSecurity(_) => Feed::SecurityEnabled,
        }
    }

    pub fn is_on(&self) -> bool {
        match self {
            Command::SetLed(on)
            | Command::SetBuzzer(on)
            | Command::SetMotor(on)
            | Command::SetSecurity(on) => *on,
        }
    }
}

/// Wire encoding of a boolean status value.
pub fn flag(on: bool) -> &'static str {
    if on {
        "1"
    } else {
        "0"
    }
}

#[cfg(test)]
#[path = "feed_tests.rs"]
mod tests;
