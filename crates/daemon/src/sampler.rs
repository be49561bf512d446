// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Environment sampler.
//!
//! Each tick takes one temperature/humidity reading, appends it to the local
//! log, and publishes it. Network state never affects the append.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use ds_core::{EnvironmentReading, Feed, LocalLog, RecordKind};

use crate::channel::Publisher;
use crate::hardware::FallbackSensor;
use crate::retry::append_durably;
use crate::runner::PeriodicTask;

pub struct EnvironmentSampler {
    sensor: FallbackSensor,
    log: Arc<LocalLog>,
    publisher: Arc<dyn Publisher>,
}

impl EnvironmentSampler {
    pub fn new(sensor: FallbackSensor, log: Arc<LocalLog>, publisher: Arc<dyn Publisher>) -> Self {
        EnvironmentSampler {
            sensor,
            log,
            publisher,
        }
    }

    /// Take one sample. Returns the local record id, if the append succeeded.
    pub async fn sample(&self) -> Option<i64> {
        let reading = self.read().await;
        let id = append_durably(RecordKind::Environment, || {
            self.log.append_environment(&reading)
        })
        .await;

        self.publisher
            .publish(Feed::Temperature, &format!("{:.1}", reading.temperature));
        self.publisher
            .publish(Feed::Humidity, &format!("{:.1}", reading.humidity));

        tracing::debug!(
            temperature = reading.temperature,
            humidity = reading.humidity,
            id = ?id,
            "environment sampled"
        );
        id
    }

    /// Sensor reads block, so they run off the async workers.
    async fn read(&self) -> EnvironmentReading {
        let sensor = self.sensor.clone();
        match tokio::task::spawn_blocking(move || sensor.read()).await {
            Ok(reading) => reading,
            Err(e) => {
                tracing::warn!(error = %e, "environment read task failed, using synthetic reading");
                crate::hardware::synthetic_reading()
            }
        }
    }
}

impl PeriodicTask for EnvironmentSampler {
    fn name(&self) -> &'static str {
        "environment sampler"
    }

    fn tick(&mut self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(async move {
            self.sample().await;
        })
    }
}

#[cfg(test)]
#[path = "sampler_tests.rs"]
mod tests;
