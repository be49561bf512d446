// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared device context.
//!
//! One [`DeviceContext`] is built at startup and shared through an `Arc` by
//! the intrusion loop and the inbound command handler. It owns the
//! authoritative actuator state and the security-enabled flag; every output
//! change goes through it so the reported state matches what was requested.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use ds_core::Command;
use serde::Serialize;

use crate::hardware::Actuators;

/// Snapshot of the three outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ActuatorState {
    pub led: bool,
    pub buzzer: bool,
    pub motor: bool,
}

pub struct DeviceContext {
    actuators: Arc<dyn Actuators>,
    led: AtomicBool,
    buzzer: AtomicBool,
    motor: AtomicBool,
    security_enabled: AtomicBool,
    /// Number of motor pulses currently running.
    pulses: AtomicUsize,
}

impl DeviceContext {
    /// Outputs start off; security starts enabled.
    pub fn new(actuators: Arc<dyn Actuators>) -> Self {
        DeviceContext {
            actuators,
            led: AtomicBool::new(false),
            buzzer: AtomicBool::new(false),
            motor: AtomicBool::new(false),
            security_enabled: AtomicBool::new(true),
            pulses: AtomicUsize::new(0),
        }
    }

    pub fn set_led(&self, on: bool) {
        if let Err(e) = self.actuators.set_led(on) {
            tracing::warn!(error = %e, on, "failed to drive alert light");
        }
        self.led.store(on, Ordering::Release);
    }

    pub fn set_buzzer(&self, on: bool) {
        if let Err(e) = self.actuators.set_buzzer(on) {
            tracing::warn!(error = %e, on, "failed to drive alarm");
        }
        self.buzzer.store(on, Ordering::Release);
    }

    pub fn set_motor(&self, on: bool) {
        if let Err(e) = self.actuators.set_motor(on) {
            tracing::warn!(error = %e, on, "failed to drive response motor");
        }
        self.motor.store(on, Ordering::Release);
    }

    pub fn actuator_state(&self) -> ActuatorState {
        ActuatorState {
            led: self.led.load(Ordering::Acquire),
            buzzer: self.buzzer.load(Ordering::Acquire),
            motor: self.motor.load(Ordering::Acquire),
        }
    }

    pub fn security_enabled(&self) -> bool {
        self.security_enabled.load(Ordering::Acquire)
    }

    pub fn set_security_enabled(&self, enabled: bool) {
        let previous = self.security_enabled.swap(enabled, Ordering::AcqRel);
        if previous != enabled {
            tracing::info!(enabled, "security toggled");
        }
    }

    /// Apply a remote command.
    pub fn apply(&self, command: Command) {
        match command {
            Command::SetLed(on) => self.set_led(on),
            Command::SetBuzzer(on) => self.set_buzzer(on),
            Command::SetMotor(on) => self.set_motor(on),
            Command::SetSecurity(on) => self.set_security_enabled(on),
        }
    }

    pub fn pulses_in_flight(&self) -> usize {
        self.pulses.load(Ordering::Acquire)
    }

    /// Register a motor pulse.
    ///
    /// With `allow_overlap` false, returns `None` while another pulse is
    /// still running.
    pub fn begin_pulse(self: &Arc<Self>, allow_overlap: bool) -> Option<PulseGuard> {
        if allow_overlap {
            self.pulses.fetch_add(1, Ordering::AcqRel);
        } else if self
            .pulses
            .compare_exchange(0, 1, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return None;
        }
        Some(PulseGuard {
            ctx: Arc::clone(self),
            ended: false,
        })
    }
}

/// A running motor pulse. The motor is switched off when the last running
/// pulse ends, including when the guard is dropped early.
pub struct PulseGuard {
    ctx: Arc<DeviceContext>,
    ended: bool,
}

impl PulseGuard {
    /// End the pulse. Returns true if the motor was switched off.
    pub fn end(mut self) -> bool {
        self.finish()
    }

    fn finish(&mut self) -> bool {
        if self.ended {
            return false;
        }
        self.ended = true;
        let remaining = self
            .ctx
            .pulses
            .fetch_sub(1, Ordering::AcqRel)
            .saturating_sub(1);
        if remaining == 0 {
            self.ctx.set_motor(false);
            true
        } else {
            false
        }
    }
}

impl Drop for PulseGuard {
    fn drop(&mut self) {
        self.finish();
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
