// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use super::*;
use crate::test_helpers::{Output, RecordingActuators, RecordingPublisher};
use std::sync::Arc;
use yare::parameterized;

fn context() -> (DeviceContext, Arc<RecordingActuators>) {
    let actuators = Arc::new(RecordingActuators::default());
    (DeviceContext::new(actuators.clone()), actuators)
}

#[parameterized(
    led_on = { "alice/feeds/led-status", "1", Output::Led(true) },
    buzzer_off = { "alice/feeds/buzzer-status", "0", Output::Buzzer(false) },
    motor_on = { "alice/feeds/motor-status", "1", Output::Motor(true) },
    underscore_spelling = { "alice/feeds/motor_status", "1", Output::Motor(true) },
)]
fn test_inbound_actuator_command(topic: &str, payload: &str, expected: Output) {
    let (ctx, actuators) = context();
    assert!(handle_inbound(&ctx, topic, payload.as_bytes()).is_some());
    assert_eq!(actuators.calls(), vec![expected]);
}

#[test]
fn test_inbound_security_toggle() {
    let (ctx, actuators) = context();
    let cmd = handle_inbound(&ctx, "alice/feeds/security-enabled", b"0");
    assert_eq!(cmd, Some(Command::SetSecurity(false)));
    assert!(!ctx.security_enabled());
    assert!(actuators.calls().is_empty());

    handle_inbound(&ctx, "alice/feeds/security-enabled", b"1");
    assert!(ctx.security_enabled());
}

#[parameterized(
    word = { "alice/feeds/led-status", "on" },
    empty = { "alice/feeds/led-status", "" },
    binary = { "alice/feeds/buzzer-status", "\u{fffd}\u{0}" },
)]
fn test_inbound_malformed_payload_is_discarded(topic: &str, payload: &str) {
    let (ctx, actuators) = context();
    assert_eq!(handle_inbound(&ctx, topic, payload.as_bytes()), None);
    assert!(actuators.calls().is_empty());
    assert!(!ctx.actuator_state().led);
}

#[test]
fn test_inbound_unknown_or_telemetry_topic_is_discarded() {
    let (ctx, actuators) = context();
    assert_eq!(handle_inbound(&ctx, "alice/feeds/pressure", b"1"), None);
    assert_eq!(handle_inbound(&ctx, "alice/feeds/temperature", b"1"), None);
    assert!(actuators.calls().is_empty());
    assert!(ctx.security_enabled());
}

#[test]
fn test_publish_alert_status() {
    let publisher = RecordingPublisher::default();
    publish_alert_status(
        &publisher,
        ActuatorState {
            led: true,
            buzzer: false,
            motor: true,
        },
    );
    assert_eq!(
        publisher.messages(),
        vec![
            (Feed::LedStatus, "1".to_string()),
            (Feed::BuzzerStatus, "0".to_string()),
        ]
    );
}

#[test]
fn test_null_publisher_accepts_everything() {
    NullPublisher.publish(Feed::Temperature, "21.0");
}
