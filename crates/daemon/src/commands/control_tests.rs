// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use super::*;
use crate::test_helpers::RecordingPublisher;
use yare::parameterized;

#[parameterized(
    led_on = { Feed::LedStatus, true, "1" },
    buzzer_off = { Feed::BuzzerStatus, false, "0" },
    motor_on = { Feed::MotorStatus, true, "1" },
    disarm = { Feed::SecurityEnabled, false, "0" },
)]
fn test_send_publishes_flag(feed: Feed, on: bool, expected: &str) {
    let publisher = RecordingPublisher::default();

    let line = send(&publisher, true, feed, on).unwrap();

    assert_eq!(publisher.values(feed), vec![expected]);
    assert!(line.contains(feed.wire_name()));
}

#[test]
fn test_send_requires_connection() {
    let publisher = RecordingPublisher::default();

    let err = send(&publisher, false, Feed::LedStatus, true).unwrap_err();

    assert!(matches!(err, Error::Channel(_)));
    assert!(publisher.messages().is_empty());
}

#[test]
fn test_send_rejects_telemetry_feed() {
    let publisher = RecordingPublisher::default();

    let err = send(&publisher, true, Feed::Temperature, true).unwrap_err();

    assert!(matches!(
        err,
        Error::Core(ds_core::Error::NotACommandFeed(_))
    ));
    assert!(publisher.messages().is_empty());
}

#[tokio::test]
async fn test_unconfigured_broker_is_rejected() {
    let err = run(&Config::default(), Feed::LedStatus, true)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}
