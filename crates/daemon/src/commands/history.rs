// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use ds_core::{Record, RecordKind};

use super::require_cloud;
use crate::config::Config;
use crate::error::Result;
use crate::sync::{PostgresStore, RemoteStore};

pub async fn run(config: &Config, kind: RecordKind, limit: u32) -> Result<()> {
    require_cloud(config)?;
    let mut store = PostgresStore::from_config(config);
    store.connect().await?;
    let rows = store.latest(kind, limit).await;
    if let Err(e) = store.disconnect().await {
        tracing::debug!(error = %e, "disconnect after history query failed");
    }
    println!("{}", format_history(kind, &rows?));
    Ok(())
}

pub(crate) fn format_history(kind: RecordKind, records: &[Record]) -> String {
    if records.is_empty() {
        return format!("No {} records", kind);
    }
    records
        .iter()
        .map(format_record)
        .collect::<Vec<_>>()
        .join("\n")
}

pub(crate) fn format_record(record: &Record) -> String {
    let at = record.timestamp().format("%Y-%m-%d %H:%M:%S");
    match record {
        Record::Environment(r) => {
            format!("{}  {:>5.1} C  {:>5.1} %", at, r.temperature, r.humidity)
        }
        Record::Motion(r) => match &r.image_name {
            Some(image) => format!("{}  motion  {}", at, image),
            None => format!("{}  motion  (no image)", at),
        },
    }
}

#[cfg(test)]
#[path = "history_tests.rs"]
mod tests;
