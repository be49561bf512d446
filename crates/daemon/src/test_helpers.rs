// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared collaborator doubles for unit tests.

#![allow(clippy::unwrap_used)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use ds_core::{Feed, Record};

use crate::channel::Publisher;
use crate::hardware::{Actuators, Camera, HardwareError, MotionSensor};
use crate::sync::{RemoteError, RemoteFuture, RemoteStore};

/// One output change requested of the hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Output {
    Led(bool),
    Buzzer(bool),
    Motor(bool),
}

/// Actuators that record every request.
#[derive(Default)]
pub struct RecordingActuators {
    pub calls: Mutex<Vec<Output>>,
    pub fail: bool,
}

impl RecordingActuators {
    pub fn failing() -> Self {
        RecordingActuators {
            calls: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn calls(&self) -> Vec<Output> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, output: Output) -> Result<(), HardwareError> {
        self.calls.lock().unwrap().push(output);
        if self.fail {
            Err(HardwareError::Unavailable("gpio"))
        } else {
            Ok(())
        }
    }
}

impl Actuators for RecordingActuators {
    fn set_led(&self, on: bool) -> Result<(), HardwareError> {
        self.record(Output::Led(on))
    }

    fn set_buzzer(&self, on: bool) -> Result<(), HardwareError> {
        self.record(Output::Buzzer(on))
    }

    fn set_motor(&self, on: bool) -> Result<(), HardwareError> {
        self.record(Output::Motor(on))
    }
}

/// Publisher that keeps every message.
#[derive(Default)]
pub struct RecordingPublisher {
    pub messages: Mutex<Vec<(Feed, String)>>,
}

impl RecordingPublisher {
    pub fn messages(&self) -> Vec<(Feed, String)> {
        self.messages.lock().unwrap().clone()
    }

    /// Values published on `feed`, in order.
    pub fn values(&self, feed: Feed) -> Vec<String> {
        self.messages()
            .into_iter()
            .filter(|(f, _)| *f == feed)
            .map(|(_, v)| v)
            .collect()
    }
}

impl Publisher for RecordingPublisher {
    fn publish(&self, feed: Feed, value: &str) {
        self.messages.lock().unwrap().push((feed, value.to_string()));
    }
}

/// Motion input that reports a fixed value.
pub struct FixedMotion(pub bool);

impl MotionSensor for FixedMotion {
    fn motion_detected(&self) -> Result<bool, HardwareError> {
        Ok(self.0)
    }
}

/// Camera returning the given bytes, or failing when `None`.
pub struct FixedCamera(pub Option<Vec<u8>>);

impl Camera for FixedCamera {
    fn capture_jpeg(&self) -> Result<Vec<u8>, HardwareError> {
        self.0.clone().ok_or(HardwareError::Device {
            device: "camera",
            reason: "no frame".to_string(),
        })
    }
}

/// In-memory remote store.
///
/// Insert outcomes can be scripted per call; unscripted inserts succeed.
#[derive(Clone, Default)]
pub struct MockRemote {
    pub connected: bool,
    pub connect_should_fail: bool,
    pub inserted: Arc<Mutex<Vec<Record>>>,
    pub script: Arc<Mutex<VecDeque<Result<(), RemoteError>>>>,
}

impl MockRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue outcomes for the next inserts.
    pub fn script(&self, outcomes: impl IntoIterator<Item = Result<(), RemoteError>>) {
        self.script.lock().unwrap().extend(outcomes);
    }

    pub fn inserted(&self) -> Vec<Record> {
        self.inserted.lock().unwrap().clone()
    }
}

impl RemoteStore for MockRemote {
    fn connect(&mut self) -> RemoteFuture<'_, ()> {
        Box::pin(async move {
            if self.connect_should_fail {
                Err(RemoteError::ConnectionFailed("mock failure".into()))
            } else {
                self.connected = true;
                Ok(())
            }
        })
    }

    fn disconnect(&mut self) -> RemoteFuture<'_, ()> {
        Box::pin(async move {
            self.connected = false;
            Ok(())
        })
    }

    fn insert<'a>(&'a mut self, record: &'a Record) -> RemoteFuture<'a, ()> {
        Box::pin(async move {
            if !self.connected {
                return Err(RemoteError::NotConnected);
            }
            let outcome = self.script.lock().unwrap().pop_front().unwrap_or(Ok(()));
            match outcome {
                Ok(()) => {
                    self.inserted.lock().unwrap().push(record.clone());
                    Ok(())
                }
                Err(RemoteError::ConnectionLost(reason)) => {
                    self.connected = false;
                    Err(RemoteError::ConnectionLost(reason))
                }
                Err(e) => Err(e),
            }
        })
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}
