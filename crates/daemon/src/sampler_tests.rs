// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use super::*;
use crate::hardware::{EnvironmentSensor, HardwareError};
use crate::test_helpers::RecordingPublisher;
use ds_core::Record;

struct FixedSensor;

impl EnvironmentSensor for FixedSensor {
    fn read(&self) -> Result<EnvironmentReading, HardwareError> {
        Ok(EnvironmentReading::now(21.04, 47.26))
    }
}

fn sampler(sensor: FallbackSensor) -> (EnvironmentSampler, Arc<LocalLog>, Arc<RecordingPublisher>) {
    let log = Arc::new(LocalLog::open_in_memory().unwrap());
    let publisher = Arc::new(RecordingPublisher::default());
    let sampler = EnvironmentSampler::new(sensor, log.clone(), publisher.clone());
    (sampler, log, publisher)
}

#[tokio::test]
async fn test_sample_appends_and_publishes() {
    let (sampler, log, publisher) = sampler(FallbackSensor::new(Some(Arc::new(FixedSensor))));

    let id = sampler.sample().await.unwrap();

    let unsynced = log.query_unsynced(RecordKind::Environment).unwrap();
    assert_eq!(unsynced.len(), 1);
    match &unsynced[0] {
        Record::Environment(r) => {
            assert_eq!(r.id, id);
            assert_eq!(r.temperature, 21.04);
            assert_eq!(r.humidity, 47.26);
        }
        Record::Motion(r) => unreachable!("unexpected motion record {r:?}"),
    }
    assert_eq!(publisher.values(Feed::Temperature), vec!["21.0"]);
    assert_eq!(publisher.values(Feed::Humidity), vec!["47.3"]);
}

#[tokio::test]
async fn test_n_ticks_yield_n_unsynced_records() {
    let (mut sampler, log, _) = sampler(FallbackSensor::default());

    for _ in 0..7 {
        sampler.tick().await;
    }

    assert_eq!(log.query_unsynced(RecordKind::Environment).unwrap().len(), 7);
    assert_eq!(log.pending_counts().unwrap().motion, 0);
}

#[tokio::test]
async fn test_missing_sensor_still_records() {
    let (sampler, log, publisher) = sampler(FallbackSensor::default());

    assert!(sampler.sample().await.is_some());
    assert_eq!(log.pending_counts().unwrap().environment, 1);
    assert_eq!(publisher.values(Feed::Temperature).len(), 1);
}
