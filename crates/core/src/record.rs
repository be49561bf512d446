// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Observation records kept in the local log.
//!
//! Two kinds of record exist: environment samples and motion events. Both
//! carry a `synced` flag that only ever moves from `false` to `true`, once
//! the record has been acknowledged by the remote store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// The two kinds of observation stored locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    /// Temperature and humidity sample.
    Environment,
    /// Detected intrusion episode.
    Motion,
}

impl RecordKind {
    /// Every kind, in the order the sync engine drains them.
    pub const ALL: [RecordKind; 2] = [RecordKind::Environment, RecordKind::Motion];

    /// Returns the string representation used in display and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Environment => "environment",
            RecordKind::Motion => "motion",
        }
    }

    /// Name of the local log table holding this kind.
    pub fn local_table(&self) -> &'static str {
        match self {
            RecordKind::Environment => "environment",
            RecordKind::Motion => "motion",
        }
    }

    /// Name of the remote table this kind is delivered to.
    pub fn remote_table(&self) -> &'static str {
        match self {
            RecordKind::Environment => "environment",
            RecordKind::Motion => "motion_events",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RecordKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "environment" | "env" => Ok(RecordKind::Environment),
            "motion" | "motion_events" => Ok(RecordKind::Motion),
            _ => Err(Error::InvalidRecordKind(s.to_string())),
        }
    }
}

/// A temperature/humidity reading that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentReading {
    pub timestamp: DateTime<Utc>,
    /// Degrees Celsius.
    pub temperature: f64,
    /// Relative humidity, percent.
    pub humidity: f64,
}

impl EnvironmentReading {
    /// Creates a reading stamped with the current time.
    pub fn now(temperature: f64, humidity: f64) -> Self {
        EnvironmentReading {
            timestamp: Utc::now(),
            temperature,
            humidity,
        }
    }
}

/// A stored environment sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentRecord {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub temperature: f64,
    pub humidity: f64,
    pub synced: bool,
}

/// A detected intrusion that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MotionEvent {
    pub timestamp: DateTime<Utc>,
    /// Name of the captured image file, if the capture succeeded.
    pub image_name: Option<String>,
}

impl MotionEvent {
    /// Creates an event stamped with the current time.
    pub fn now(image_name: Option<String>) -> Self {
        MotionEvent {
            timestamp: Utc::now(),
            image_name,
        }
    }
}

/// A stored motion event.
///
/// `motion` is always `true`: periods without motion are not persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MotionRecord {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub motion: bool,
    pub image_name: Option<String>,
    pub synced: bool,
}

/// A stored record of either kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Record {
    Environment(EnvironmentRecord),
    Motion(MotionRecord),
}

impl Record {
    /// Local log id.
    pub fn id(&self) -> i64 {
        match self {
            Record::Environment(r) => r.id,
            Record::Motion(r) => r.id,
        }
    }

    pub fn kind(&self) -> RecordKind {
        match self {
            Record::Environment(_) => RecordKind::Environment,
            Record::Motion(_) => RecordKind::Motion,
        }
    }

    /// Originating timestamp, used by the remote store as the idempotency key.
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Record::Environment(r) => r.timestamp,
            Record::Motion(r) => r.timestamp,
        }
    }

    pub fn is_synced(&self) -> bool {
        match self {
            Record::Environment(r) => r.synced,
            Record::Motion(r) => r.synced,
        }
    }
}

/// Number of records waiting for delivery, per kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingCounts {
    pub environment: usize,
    pub motion: usize,
}

impl PendingCounts {
    pub fn get(&self, kind: RecordKind) -> usize {
        match kind {
            RecordKind::Environment => self.environment,
            RecordKind::Motion => self.motion,
        }
    }

    pub fn total(&self) -> usize {
        self.environment + self.motion
    }
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod tests;
