// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use ds_core::{LocalLog, PendingCounts};
use serde::Serialize;

use crate::config::StatePaths;
use crate::error::Result;

/// Records waiting for delivery to the remote store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    pub environment: usize,
    pub motion: usize,
    pub total: usize,
}

impl From<PendingCounts> for StatusReport {
    fn from(counts: PendingCounts) -> Self {
        StatusReport {
            environment: counts.environment,
            motion: counts.motion,
            total: counts.total(),
        }
    }
}

pub fn run(paths: &StatePaths, json: bool) -> Result<()> {
    let log = LocalLog::open(&paths.local_log())?;
    run_impl(&log, json)
}

pub(crate) fn run_impl(log: &LocalLog, json: bool) -> Result<()> {
    let report = StatusReport::from(log.pending_counts()?);
    println!("{}", format_report(&report, json)?);
    Ok(())
}

pub(crate) fn format_report(report: &StatusReport, json: bool) -> Result<String> {
    if json {
        return Ok(serde_json::to_string_pretty(report)?);
    }
    if report.total == 0 {
        return Ok("All records synced".to_string());
    }
    Ok(format!(
        "Pending sync:\n  environment: {}\n  motion:      {}\n  total:       {}",
        report.environment, report.motion, report.total
    ))
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
