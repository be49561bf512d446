// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Sync engine: one reconciliation pass per cycle.
//!
//! Each cycle connects if needed, then drains every record kind
//! independently in ascending id order. Within a kind the pass stops at the
//! first insert failure, so a record is never marked synced ahead of an
//! older one that has not been delivered. Delivered ids are marked synced in
//! one bulk update after the pass.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use ds_core::{LocalLog, RecordKind};
use serde::Serialize;

use super::remote::{RemoteError, RemoteStore};
use crate::error::Result;

/// Records delivered by one cycle, per kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub environment: usize,
    pub motion: usize,
}

impl SyncReport {
    pub fn total(&self) -> usize {
        self.environment + self.motion
    }

    fn set(&mut self, kind: RecordKind, count: usize) {
        match kind {
            RecordKind::Environment => self.environment = count,
            RecordKind::Motion => self.motion = count,
        }
    }
}

/// Point-in-time view of the engine for status reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SyncSnapshot {
    pub connected: bool,
    pub last_sync: Option<DateTime<Utc>>,
}

/// Engine status shared with readers outside the sync loop.
#[derive(Debug, Default)]
pub struct SyncStatus {
    connected: AtomicBool,
    last_sync: Mutex<Option<DateTime<Utc>>>,
}

impl SyncStatus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> SyncSnapshot {
        SyncSnapshot {
            connected: self.connected.load(Ordering::Acquire),
            last_sync: self.last_sync.lock().map(|g| *g).unwrap_or_default(),
        }
    }

    fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::Release);
    }

    fn touch(&self, at: DateTime<Utc>) {
        if let Ok(mut last) = self.last_sync.lock() {
            *last = Some(at);
        }
    }
}

pub struct SyncEngine<R: RemoteStore> {
    log: Arc<LocalLog>,
    remote: R,
    status: Arc<SyncStatus>,
}

impl<R: RemoteStore> SyncEngine<R> {
    pub fn new(log: Arc<LocalLog>, remote: R) -> Self {
        SyncEngine {
            log,
            remote,
            status: Arc::new(SyncStatus::new()),
        }
    }

    pub fn status(&self) -> Arc<SyncStatus> {
        Arc::clone(&self.status)
    }

    pub fn remote_mut(&mut self) -> &mut R {
        &mut self.remote
    }

    /// Run one pass and log where the engine stands afterwards.
    ///
    /// A failed pass is logged and left for the next period.
    pub async fn run_cycle(&mut self) -> SyncSnapshot {
        if let Err(e) = self.sync_cycle().await {
            tracing::warn!(error = %e, "sync cycle paused, retrying next period");
        }

        let snapshot = self.status.snapshot();
        match self.log.pending_counts() {
            Ok(pending) => tracing::info!(
                connected = snapshot.connected,
                last_sync = ?snapshot.last_sync,
                pending_environment = pending.environment,
                pending_motion = pending.motion,
                "sync status"
            ),
            Err(e) => tracing::warn!(
                connected = snapshot.connected,
                last_sync = ?snapshot.last_sync,
                error = %e,
                "sync status, pending counts unavailable"
            ),
        }
        snapshot
    }

    /// Run one reconciliation pass.
    ///
    /// Fails only if the remote store cannot be reached or the local log
    /// cannot be read; insert failures end the pass for that kind early and
    /// are reported through the returned counts.
    pub async fn sync_cycle(&mut self) -> Result<SyncReport> {
        if !self.remote.is_connected() {
            if let Err(e) = self.remote.connect().await {
                self.status.set_connected(false);
                return Err(e.into());
            }
            tracing::info!("connected to remote store");
        }
        self.status.set_connected(true);

        let mut report = SyncReport::default();
        for kind in RecordKind::ALL {
            let count = self.sync_kind(kind).await?;
            report.set(kind, count);
            if !self.remote.is_connected() {
                tracing::warn!("remote store connection lost, resuming next cycle");
                break;
            }
        }

        self.status.set_connected(self.remote.is_connected());
        if report.total() > 0 {
            self.status.touch(Utc::now());
            tracing::info!(
                environment = report.environment,
                motion = report.motion,
                "sync cycle delivered records"
            );
        }
        Ok(report)
    }

    async fn sync_kind(&mut self, kind: RecordKind) -> Result<usize> {
        let records = self.log.query_unsynced(kind)?;
        if records.is_empty() {
            return Ok(0);
        }

        let mut delivered = Vec::with_capacity(records.len());
        for record in &records {
            match self.remote.insert(record).await {
                Ok(()) => delivered.push(record.id()),
                Err(e) => {
                    log_insert_failure(kind, record.id(), &e);
                    break;
                }
            }
        }

        if !delivered.is_empty() {
            self.log.mark_synced(kind, &delivered)?;
        }
        tracing::debug!(
            kind = kind.as_str(),
            delivered = delivered.len(),
            pending = records.len() - delivered.len(),
            "sync pass finished"
        );
        Ok(delivered.len())
    }
}

fn log_insert_failure(kind: RecordKind, id: i64, err: &RemoteError) {
    match err {
        RemoteError::Rejected(_) => {
            tracing::warn!(kind = kind.as_str(), id, error = %err, "remote store rejected record");
        }
        _ => {
            tracing::warn!(kind = kind.as_str(), id, error = %err, "remote insert failed");
        }
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
