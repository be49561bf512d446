// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Intrusion state machine.
//!
//! ```text
//!   IDLE ──(motion, armed)──► ALERTING ──(dwell)──► IDLE
//! ```
//!
//! Entering ALERTING turns the light and alarm on, starts a detached motor
//! pulse, and starts a capture. The alarm goes off when the dwell elapses,
//! even if the capture is still running. Once the capture finishes one
//! motion record is appended and the result is published. The light stays
//! on until an idle poll sees no motion.

use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;

use base64::Engine as _;
use chrono::{DateTime, Utc};
use ds_core::{flag, Feed, LocalLog, MotionEvent, RecordKind};
use tokio::task::JoinHandle;

use crate::channel::{publish_alert_status, Publisher, MAX_PAYLOAD_SIZE};
use crate::config::IntrusionConfig;
use crate::context::DeviceContext;
use crate::hardware::{Camera, HardwareError, MotionSensor};
use crate::retry::append_durably;
use crate::runner::PeriodicTask;

/// Machine state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntrusionState {
    Idle,
    Alerting,
}

impl IntrusionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            IntrusionState::Idle => "idle",
            IntrusionState::Alerting => "alerting",
        }
    }
}

impl fmt::Display for IntrusionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What one poll did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// No motion; outputs ensured off.
    Idle,
    /// Security disabled; motion (if any) ignored.
    Disarmed { motion_seen: bool },
    /// A full alert cycle ran.
    Detected {
        /// Local record id, `None` if the append was lost.
        record_id: Option<i64>,
        image_name: Option<String>,
    },
}

pub struct IntrusionMonitor {
    ctx: Arc<DeviceContext>,
    sensor: Arc<dyn MotionSensor>,
    /// `None` when capture is disabled.
    camera: Option<Arc<dyn Camera>>,
    log: Arc<LocalLog>,
    publisher: Arc<dyn Publisher>,
    captures_dir: PathBuf,
    timings: IntrusionConfig,
    state: IntrusionState,
}

impl IntrusionMonitor {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        ctx: Arc<DeviceContext>,
        sensor: Arc<dyn MotionSensor>,
        camera: Option<Arc<dyn Camera>>,
        log: Arc<LocalLog>,
        publisher: Arc<dyn Publisher>,
        captures_dir: PathBuf,
        timings: IntrusionConfig,
    ) -> Self {
        IntrusionMonitor {
            ctx,
            sensor,
            camera,
            log,
            publisher,
            captures_dir,
            timings,
            state: IntrusionState::Idle,
        }
    }

    #[cfg(test)]
    pub(crate) fn state(&self) -> IntrusionState {
        self.state
    }

    /// Poll the motion sensor once and react.
    pub async fn cycle(&mut self) -> CycleOutcome {
        let motion = match self.sensor.motion_detected() {
            Ok(motion) => motion,
            Err(e) => {
                tracing::warn!(error = %e, "motion sensor read failed, treating as no motion");
                false
            }
        };

        if !self.ctx.security_enabled() {
            if motion {
                tracing::debug!("motion ignored, security disabled");
            }
            self.publisher.publish(Feed::Motion, flag(false));
            publish_alert_status(self.publisher.as_ref(), self.ctx.actuator_state());
            return CycleOutcome::Disarmed {
                motion_seen: motion,
            };
        }

        if motion {
            self.alert().await
        } else {
            self.ctx.set_led(false);
            self.ctx.set_buzzer(false);
            self.publisher.publish(Feed::Motion, flag(false));
            publish_alert_status(self.publisher.as_ref(), self.ctx.actuator_state());
            CycleOutcome::Idle
        }
    }

    async fn alert(&mut self) -> CycleOutcome {
        self.transition(IntrusionState::Alerting);
        let detected_at = Utc::now();

        self.ctx.set_led(true);
        self.ctx.set_buzzer(true);
        self.start_motor_pulse();
        let capture = self.start_capture();

        tokio::time::sleep(self.timings.dwell()).await;
        self.ctx.set_buzzer(false);

        let image = match capture {
            Some(handle) => finish_capture(handle).await,
            None => None,
        };

        let image_name = match &image {
            Some(bytes) => match save_capture(&self.captures_dir, bytes, detected_at) {
                Ok(name) => Some(name),
                Err(e) => {
                    tracing::warn!(error = %e, "failed to save capture");
                    None
                }
            },
            None => None,
        };

        let event = MotionEvent {
            timestamp: detected_at,
            image_name: image_name.clone(),
        };
        let record_id =
            append_durably(RecordKind::Motion, || self.log.append_motion(&event)).await;

        let state = self.ctx.actuator_state();
        self.publisher.publish(Feed::Motion, flag(true));
        publish_alert_status(self.publisher.as_ref(), state);
        self.publisher.publish(Feed::MotorStatus, flag(state.motor));
        if let Some(bytes) = &image {
            self.publish_image(bytes);
        }

        self.transition(IntrusionState::Idle);
        tracing::info!(record_id = ?record_id, image = ?image_name, "alert cycle complete");
        CycleOutcome::Detected {
            record_id,
            image_name,
        }
    }

    fn transition(&mut self, to: IntrusionState) {
        if self.state != to {
            tracing::info!(from = %self.state, to = %to, "intrusion state changed");
            self.state = to;
        }
    }

    /// Publish a capture unless its encoding exceeds the packet limit.
    fn publish_image(&self, jpeg: &[u8]) {
        let encoded = base64::engine::general_purpose::STANDARD.encode(jpeg);
        if encoded.len() > MAX_PAYLOAD_SIZE {
            tracing::warn!(
                encoded_bytes = encoded.len(),
                limit = MAX_PAYLOAD_SIZE,
                "capture too large to publish, kept on disk only"
            );
            return;
        }
        self.publisher.publish(Feed::CameraLastImage, &encoded);
    }

    /// Run the response motor for one pulse in a detached task.
    fn start_motor_pulse(&self) {
        let Some(pulse) = self
            .ctx
            .begin_pulse(self.timings.allow_overlapping_pulses)
        else {
            tracing::debug!(
                in_flight = self.ctx.pulses_in_flight(),
                "motor pulse already running, skipping"
            );
            return;
        };

        self.ctx.set_motor(true);
        self.publisher.publish(Feed::MotorStatus, flag(true));

        let publisher = Arc::clone(&self.publisher);
        let duration = self.timings.motor_pulse();
        tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            if pulse.end() {
                publisher.publish(Feed::MotorStatus, flag(false));
            }
        });
    }

    /// Start a capture off the async workers. `None` when capture is
    /// disabled.
    fn start_capture(&self) -> Option<JoinHandle<Result<Vec<u8>, HardwareError>>> {
        let camera = Arc::clone(self.camera.as_ref()?);
        Some(tokio::task::spawn_blocking(move || camera.capture_jpeg()))
    }
}

/// Wait for a capture started with `start_capture`. `None` on any failure.
async fn finish_capture(handle: JoinHandle<Result<Vec<u8>, HardwareError>>) -> Option<Vec<u8>> {
    match handle.await {
        Ok(Ok(bytes)) => Some(bytes),
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "capture failed");
            None
        }
        Err(e) => {
            tracing::warn!(error = %e, "capture task failed");
            None
        }
    }
}

/// File name for a capture taken at `at`.
pub fn capture_file_name(at: DateTime<Utc>) -> String {
    format!("motion_{}.jpg", at.format("%Y%m%d_%H%M%S"))
}

/// Write a capture into `dir`, returning its file name.
pub fn save_capture(dir: &Path, jpeg: &[u8], at: DateTime<Utc>) -> std::io::Result<String> {
    std::fs::create_dir_all(dir)?;
    let name = capture_file_name(at);
    std::fs::write(dir.join(&name), jpeg)?;
    Ok(name)
}

impl PeriodicTask for IntrusionMonitor {
    fn name(&self) -> &'static str {
        "intrusion monitor"
    }

    fn tick(&mut self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(async move {
            self.cycle().await;
        })
    }
}

#[cfg(test)]
#[path = "intrusion_tests.rs"]
mod tests;
