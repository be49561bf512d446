// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;

use ds_core::{LocalLog, PendingCounts};

use super::require_cloud;
use crate::config::{Config, StatePaths};
use crate::error::Result;
use crate::sync::{PostgresStore, RemoteStore, SyncEngine, SyncReport};

pub async fn run(config: &Config, paths: &StatePaths) -> Result<()> {
    require_cloud(config)?;
    let log = Arc::new(LocalLog::open(&paths.local_log())?);
    let report = run_impl(Arc::clone(&log), PostgresStore::from_config(config)).await?;
    println!("{}", format_report(&report, log.pending_counts()?));
    Ok(())
}

/// Run one cycle and release the connection.
pub(crate) async fn run_impl<R: RemoteStore>(log: Arc<LocalLog>, remote: R) -> Result<SyncReport> {
    let mut engine = SyncEngine::new(log, remote);
    let report = engine.sync_cycle().await;
    if let Err(e) = engine.remote_mut().disconnect().await {
        tracing::debug!(error = %e, "disconnect after sync failed");
    }
    report
}

pub(crate) fn format_report(report: &SyncReport, pending: PendingCounts) -> String {
    let mut out = format!(
        "Synced {} environment and {} motion record(s)",
        report.environment, report.motion
    );
    if pending.total() > 0 {
        out.push_str(&format!(", {} still pending", pending.total()));
    }
    out
}

#[cfg(test)]
#[path = "sync_tests.rs"]
mod tests;
