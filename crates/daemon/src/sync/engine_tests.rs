// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use super::*;
use crate::error::Error;
use crate::test_helpers::MockRemote;
use ds_core::{EnvironmentReading, MotionEvent, Record};

fn log_with_environment(n: usize) -> Arc<LocalLog> {
    let log = Arc::new(LocalLog::open_in_memory().unwrap());
    for i in 0..n {
        log.append_environment(&EnvironmentReading::now(20.0 + i as f64, 50.0))
            .unwrap();
    }
    log
}

fn inserted_ids(remote: &MockRemote) -> Vec<i64> {
    remote.inserted().iter().map(Record::id).collect()
}

fn unsynced_ids(log: &LocalLog, kind: RecordKind) -> Vec<i64> {
    log.query_unsynced(kind)
        .unwrap()
        .iter()
        .map(Record::id)
        .collect()
}

#[tokio::test]
async fn test_cycle_drains_everything_when_remote_accepts() {
    let log = log_with_environment(3);
    log.append_motion(&MotionEvent::now(Some("motion_a.jpg".into())))
        .unwrap();
    let remote = MockRemote::new();
    let mut engine = SyncEngine::new(log.clone(), remote.clone());

    let report = engine.sync_cycle().await.unwrap();

    assert_eq!(report, SyncReport {
        environment: 3,
        motion: 1,
    });
    assert!(log.query_unsynced(RecordKind::Environment).unwrap().is_empty());
    assert!(log.query_unsynced(RecordKind::Motion).unwrap().is_empty());
    assert_eq!(remote.inserted().len(), 4);
}

#[tokio::test]
async fn test_cycle_stops_at_first_failure_within_kind() {
    let log = log_with_environment(5);
    let remote = MockRemote::new();
    remote.script([
        Ok(()),
        Ok(()),
        Err(RemoteError::Rejected("check constraint".into())),
    ]);
    let mut engine = SyncEngine::new(log.clone(), remote.clone());

    let report = engine.sync_cycle().await.unwrap();

    assert_eq!(report.environment, 2);
    assert_eq!(inserted_ids(&remote), vec![1, 2]);
    assert_eq!(unsynced_ids(&log, RecordKind::Environment), vec![3, 4, 5]);
}

#[tokio::test]
async fn test_failure_in_one_kind_does_not_block_the_other() {
    let log = log_with_environment(2);
    log.append_motion(&MotionEvent::now(None)).unwrap();
    let remote = MockRemote::new();
    remote.script([Err(RemoteError::Rejected("bad row".into()))]);
    let mut engine = SyncEngine::new(log.clone(), remote.clone());

    let report = engine.sync_cycle().await.unwrap();

    assert_eq!(report, SyncReport {
        environment: 0,
        motion: 1,
    });
    assert_eq!(log.pending_counts().unwrap().environment, 2);
    assert_eq!(log.pending_counts().unwrap().motion, 0);
}

#[tokio::test]
async fn test_connection_lost_mid_pass_defers_to_next_cycle() {
    let log = log_with_environment(3);
    log.append_motion(&MotionEvent::now(None)).unwrap();
    let remote = MockRemote::new();
    remote.script([Ok(()), Err(RemoteError::ConnectionLost("reset".into()))]);
    let mut engine = SyncEngine::new(log.clone(), remote);

    let report = engine.sync_cycle().await.unwrap();
    assert_eq!(report, SyncReport {
        environment: 1,
        motion: 0,
    });
    assert!(!engine.remote_mut().is_connected());
    assert!(!engine.status().snapshot().connected);

    // Next cycle reconnects and drains the rest.
    let report = engine.sync_cycle().await.unwrap();
    assert_eq!(report, SyncReport {
        environment: 2,
        motion: 1,
    });
    assert_eq!(log.pending_counts().unwrap().total(), 0);
}

#[tokio::test]
async fn test_connect_failure_pauses_cycle() {
    let log = log_with_environment(2);
    let mut remote = MockRemote::new();
    remote.connect_should_fail = true;
    let mut engine = SyncEngine::new(log.clone(), remote);

    let err = engine.sync_cycle().await.unwrap_err();
    assert!(matches!(
        err,
        Error::Remote(RemoteError::ConnectionFailed(_))
    ));
    assert_eq!(log.pending_counts().unwrap().environment, 2);
    assert!(!engine.status().snapshot().connected);

    engine.remote_mut().connect_should_fail = false;
    let report = engine.sync_cycle().await.unwrap();
    assert_eq!(report.environment, 2);
}

#[tokio::test]
async fn test_empty_log_is_a_quiet_cycle() {
    let log = Arc::new(LocalLog::open_in_memory().unwrap());
    let remote = MockRemote::new();
    let mut engine = SyncEngine::new(log, remote.clone());

    let report = engine.sync_cycle().await.unwrap();
    assert_eq!(report.total(), 0);
    assert!(remote.inserted().is_empty());

    let snapshot = engine.status().snapshot();
    assert!(snapshot.connected);
    assert_eq!(snapshot.last_sync, None);
}

#[tokio::test]
async fn test_last_sync_updates_when_records_delivered() {
    let log = log_with_environment(1);
    let mut engine = SyncEngine::new(log, MockRemote::new());
    let before = Utc::now();

    engine.sync_cycle().await.unwrap();

    let last = engine.status().snapshot().last_sync.unwrap();
    assert!(last >= before);
}

#[tokio::test]
async fn test_second_cycle_after_full_drain_sends_nothing() {
    let log = log_with_environment(2);
    let remote = MockRemote::new();
    let mut engine = SyncEngine::new(log.clone(), remote.clone());

    engine.sync_cycle().await.unwrap();
    assert!(unsynced_ids(&log, RecordKind::Environment).is_empty());

    assert_eq!(log.mark_synced(RecordKind::Environment, &[1, 2]).unwrap(), 0);
    assert_eq!(engine.sync_cycle().await.unwrap().total(), 0);
    assert_eq!(remote.inserted().len(), 2);
}

#[tokio::test]
async fn test_records_delivered_oldest_first() {
    let log = log_with_environment(4);
    let remote = MockRemote::new();
    let mut engine = SyncEngine::new(log, remote.clone());

    engine.sync_cycle().await.unwrap();
    assert_eq!(inserted_ids(&remote), vec![1, 2, 3, 4]);
}

#[test]
fn test_report_total() {
    let report = SyncReport {
        environment: 3,
        motion: 2,
    };
    assert_eq!(report.total(), 5);
}

#[tokio::test]
async fn test_run_cycle_reports_status_after_each_pass() {
    let log = log_with_environment(2);
    let mut remote = MockRemote::new();
    remote.connect_should_fail = true;
    let mut engine = SyncEngine::new(log.clone(), remote);

    let snapshot = engine.run_cycle().await;
    assert!(!snapshot.connected);
    assert!(snapshot.last_sync.is_none());
    assert_eq!(log.pending_counts().unwrap().environment, 2);

    engine.remote_mut().connect_should_fail = false;
    let snapshot = engine.run_cycle().await;
    assert!(snapshot.connected);
    assert!(snapshot.last_sync.is_some());
    assert_eq!(snapshot, engine.status().snapshot());
    assert_eq!(log.pending_counts().unwrap().total(), 0);
}
