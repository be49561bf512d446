// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use super::*;
use yare::parameterized;

#[parameterized(
    led = { Feed::LedStatus, "led-status", "led_status" },
    buzzer = { Feed::BuzzerStatus, "buzzer-status", "buzzer_status" },
    motor = { Feed::MotorStatus, "motor-status", "motor_status" },
    camera = { Feed::CameraLastImage, "camera-last-image", "camera_last_image" },
    security = { Feed::SecurityEnabled, "security-enabled", "security_enabled" },
    temperature = { Feed::Temperature, "temperature", "temperature" },
)]
fn test_feed_names(feed: Feed, wire: &str, internal: &str) {
    assert_eq!(feed.wire_name(), wire);
    assert_eq!(feed.internal_name(), internal);
    assert_eq!(wire.parse::<Feed>().unwrap(), feed);
    assert_eq!(internal.parse::<Feed>().unwrap(), feed);
}

#[test]
fn test_every_feed_translates_both_ways() {
    for feed in Feed::ALL {
        assert_eq!(feed.internal_name().replace('_', "-"), feed.wire_name());
        assert_eq!(feed.to_string().parse::<Feed>().unwrap(), feed);
    }
}

#[test]
fn test_unknown_feed() {
    let err = "pressure".parse::<Feed>().unwrap_err();
    assert!(matches!(err, Error::UnknownFeed(s) if s == "pressure"));
}

#[test]
fn test_topic_round_trip() {
    let topic = Feed::SecurityEnabled.topic("alice");
    assert_eq!(topic, "alice/feeds/security-enabled");
    assert_eq!(Feed::from_topic(&topic).unwrap(), Feed::SecurityEnabled);
    assert_eq!(Feed::from_topic("motor-status").unwrap(), Feed::MotorStatus);
}

#[test]
fn test_command_feeds() {
    assert!(Feed::LedStatus.is_command());
    assert!(Feed::SecurityEnabled.is_command());
    assert!(!Feed::Temperature.is_command());
    assert!(!Feed::CameraLastImage.is_command());
}

#[parameterized(
    led_on = { Feed::LedStatus, "1", Command::SetLed(true) },
    led_off = { Feed::LedStatus, "0", Command::SetLed(false) },
    buzzer_on = { Feed::BuzzerStatus, "1", Command::SetBuzzer(true) },
    motor_off = { Feed::MotorStatus, "0", Command::SetMotor(false) },
    security_on = { Feed::SecurityEnabled, "1", Command::SetSecurity(true) },
    security_off = { Feed::SecurityEnabled, "0", Command::SetSecurity(false) },
    whitespace = { Feed::LedStatus, " 1\n", Command::SetLed(true) },
    other_integer_is_off = { Feed::LedStatus, "2", Command::SetLed(false) },
)]
fn test_command_parse(feed: Feed, payload: &str, expected: Command) {
    let command = Command::parse(feed, payload.as_bytes()).unwrap();
    assert_eq!(command, expected);
    assert_eq!(command.feed(), feed);
}

#[parameterized(
    word = { "on" },
    empty = { "" },
    float = { "1.0" },
)]
fn test_command_parse_malformed(payload: &str) {
    let err = Command::parse(Feed::BuzzerStatus, payload.as_bytes()).unwrap_err();
    assert!(matches!(err, Error::MalformedPayload { ref feed, .. } if feed == "buzzer-status"));
}

#[test]
fn test_command_parse_rejects_telemetry_feed() {
    let err = Command::parse(Feed::Temperature, b"1").unwrap_err();
    assert!(matches!(err, Error::NotACommandFeed(s) if s == "temperature"));
}

#[test]
fn test_command_is_on() {
    assert!(Command::SetMotor(true).is_on());
    assert!(!Command::SetSecurity(false).is_on());
}

#[test]
fn test_flag() {
    assert_eq!(flag(true), "1");
    assert_eq!(flag(false), "0");
}
