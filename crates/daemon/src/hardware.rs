// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Hardware collaborator interfaces.
//!
//! Drivers for the GPIO outputs, the PIR sensor, the DHT sensor, and the
//! camera are outside this crate. The agent talks to them through the traits
//! below; when a device is absent a degraded stand-in is used instead and a
//! warning is logged.

use std::sync::Arc;

use ds_core::EnvironmentReading;
use rand::Rng;
use thiserror::Error;

/// Errors reported by hardware collaborators.
#[derive(Debug, Error)]
pub enum HardwareError {
    #[error("{0} not available")]
    Unavailable(&'static str),

    #[error("{device} failure: {reason}")]
    Device {
        device: &'static str,
        reason: String,
    },
}

/// Alert light, audible alarm, and response motor outputs.
pub trait Actuators: Send + Sync {
    fn set_led(&self, on: bool) -> Result<(), HardwareError>;
    fn set_buzzer(&self, on: bool) -> Result<(), HardwareError>;
    fn set_motor(&self, on: bool) -> Result<(), HardwareError>;
}

/// Passive infrared motion input.
pub trait MotionSensor: Send + Sync {
    fn motion_detected(&self) -> Result<bool, HardwareError>;
}

/// Temperature/humidity input.
pub trait EnvironmentSensor: Send + Sync {
    fn read(&self) -> Result<EnvironmentReading, HardwareError>;
}

/// Still camera. Returns a JPEG image.
pub trait Camera: Send + Sync {
    fn capture_jpeg(&self) -> Result<Vec<u8>, HardwareError>;
}

/// Outputs that accept every request and drive nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoActuators;

impl Actuators for NoActuators {
    fn set_led(&self, _on: bool) -> Result<(), HardwareError> {
        Ok(())
    }

    fn set_buzzer(&self, _on: bool) -> Result<(), HardwareError> {
        Ok(())
    }

    fn set_motor(&self, _on: bool) -> Result<(), HardwareError> {
        Ok(())
    }
}

/// A motion input that never fires.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoMotionSensor;

impl MotionSensor for NoMotionSensor {
    fn motion_detected(&self) -> Result<bool, HardwareError> {
        Ok(false)
    }
}

/// A camera that is never available.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCamera;

impl Camera for NoCamera {
    fn capture_jpeg(&self) -> Result<Vec<u8>, HardwareError> {
        Err(HardwareError::Unavailable("camera"))
    }
}

/// Environment source that substitutes a synthetic reading when the sensor
/// is missing or fails.
#[derive(Clone, Default)]
pub struct FallbackSensor {
    sensor: Option<Arc<dyn EnvironmentSensor>>,
}

impl FallbackSensor {
    pub fn new(sensor: Option<Arc<dyn EnvironmentSensor>>) -> Self {
        FallbackSensor { sensor }
    }

    /// Reads the sensor, or synthesizes a plausible reading.
    pub fn read(&self) -> EnvironmentReading {
        match &self.sensor {
            Some(sensor) => match sensor.read() {
                Ok(reading) => reading,
                Err(e) => {
                    tracing::warn!(error = %e, "environment sensor read failed, using synthetic reading");
                    synthetic_reading()
                }
            },
            None => {
                tracing::warn!("environment sensor not available, using synthetic reading");
                synthetic_reading()
            }
        }
    }
}

/// 22 ± 2 °C and 55 ± 10 %RH, rounded to one decimal.
pub fn synthetic_reading() -> EnvironmentReading {
    let mut rng = rand::thread_rng();
    let temperature = round1(22.0 + rng.gen_range(-2.0..=2.0));
    let humidity = round1(55.0 + rng.gen_range(-10.0..=10.0));
    EnvironmentReading::now(temperature, humidity)
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// The set of hardware collaborators the agent runs with.
#[derive(Clone)]
pub struct Hardware {
    pub actuators: Arc<dyn Actuators>,
    pub motion: Arc<dyn MotionSensor>,
    pub environment: Option<Arc<dyn EnvironmentSensor>>,
    pub camera: Arc<dyn Camera>,
}

impl Hardware {
    /// Stand-ins for every device: no-op outputs, no motion, synthetic
    /// environment readings, no camera.
    pub fn simulated() -> Self {
        Hardware {
            actuators: Arc::new(NoActuators),
            motion: Arc::new(NoMotionSensor),
            environment: None,
            camera: Arc::new(NoCamera),
        }
    }
}

#[cfg(test)]
#[path = "hardware_tests.rs"]
mod tests;
