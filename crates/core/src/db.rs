// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! SQLite-backed durable local log.
//!
//! The [`LocalLog`] is the single source of truth for whether an observation
//! has reached the remote store. Records are appended with `synced = 0` and
//! flipped to `synced = 1` by the sync engine once the remote store has
//! acknowledged them. Every operation goes through one mutex-guarded
//! connection, so appends, unsynced queries, and bulk updates issued from
//! different loops are serialized.

use chrono::{DateTime, Utc};
use rusqlite::{params, params_from_iter, Connection, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use crate::error::{Error, Result};
use crate::record::{
    EnvironmentReading, EnvironmentRecord, MotionEvent, MotionRecord, PendingCounts, Record,
    RecordKind,
};

/// SQL schema for the local log.
pub const SCHEMA: &str = r#"
-- Environment samples
CREATE TABLE IF NOT EXISTS environment (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    timestamp TEXT NOT NULL,
    temperature REAL NOT NULL,
    humidity REAL NOT NULL,
    synced INTEGER NOT NULL DEFAULT 0
);

-- Motion events (one row per detected intrusion)
CREATE TABLE IF NOT EXISTS motion (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    timestamp TEXT NOT NULL,
    motion INTEGER NOT NULL DEFAULT 1,
    image_name TEXT,
    synced INTEGER NOT NULL DEFAULT 0
);

-- Unsynced scans
CREATE INDEX IF NOT EXISTS idx_environment_synced ON environment(synced, id);
CREATE INDEX IF NOT EXISTS idx_motion_synced ON motion(synced, id);
"#;

/// Upper bound on ids bound into a single `UPDATE ... IN (...)` statement.
const MARK_CHUNK: usize = 500;

/// Parse an RFC3339 timestamp from the database.
fn parse_timestamp(
    value: &str,
    column: &str,
) -> std::result::Result<DateTime<Utc>, rusqlite::Error> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| {
            rusqlite::Error::FromSqlConversionFailure(
                0,
                rusqlite::types::Type::Text,
                Box::new(Error::CorruptedData(format!(
                    "invalid timestamp '{value}' in column '{column}'"
                ))),
            )
        })
}

fn environment_from_row(row: &Row<'_>) -> std::result::Result<EnvironmentRecord, rusqlite::Error> {
    let timestamp: String = row.get(1)?;
    Ok(EnvironmentRecord {
        id: row.get(0)?,
        timestamp: parse_timestamp(&timestamp, "timestamp")?,
        temperature: row.get(2)?,
        humidity: row.get(3)?,
        synced: row.get(4)?,
    })
}

fn motion_from_row(row: &Row<'_>) -> std::result::Result<MotionRecord, rusqlite::Error> {
    let timestamp: String = row.get(1)?;
    Ok(MotionRecord {
        id: row.get(0)?,
        timestamp: parse_timestamp(&timestamp, "timestamp")?,
        motion: row.get(2)?,
        image_name: row.get(3)?,
        synced: row.get(4)?,
    })
}

/// Durable on-device store of environment and motion observations.
pub struct LocalLog {
    conn: Mutex<Connection>,
}

impl LocalLog {
    /// Open the log at the given path, creating the file and schema if needed.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = FULL;
             PRAGMA busy_timeout = 5000;",
        )?;
        conn.execute_batch(SCHEMA)?;

        Ok(LocalLog {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory log (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA busy_timeout = 5000;")?;
        conn.execute_batch(SCHEMA)?;
        Ok(LocalLog {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| Error::LockPoisoned)
    }

    /// Append an environment sample, returning its id.
    pub fn append_environment(&self, reading: &EnvironmentReading) -> Result<i64> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO environment (timestamp, temperature, humidity, synced)
             VALUES (?1, ?2, ?3, 0)",
            params![
                reading.timestamp.to_rfc3339(),
                reading.temperature,
                reading.humidity
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Append a motion event, returning its id.
    pub fn append_motion(&self, event: &MotionEvent) -> Result<i64> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO motion (timestamp, motion, image_name, synced)
             VALUES (?1, 1, ?2, 0)",
            params![event.timestamp.to_rfc3339(), event.image_name],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// All records of `kind` not yet delivered, oldest first.
    pub fn query_unsynced(&self, kind: RecordKind) -> Result<Vec<Record>> {
        let conn = self.lock()?;
        let records = match kind {
            RecordKind::Environment => {
                let mut stmt = conn.prepare(
                    "SELECT id, timestamp, temperature, humidity, synced
                     FROM environment WHERE synced = 0 ORDER BY id ASC",
                )?;
                let rows = stmt.query_map([], environment_from_row)?;
                rows.map(|r| r.map(Record::Environment))
                    .collect::<std::result::Result<Vec<_>, _>>()?
            }
            RecordKind::Motion => {
                let mut stmt = conn.prepare(
                    "SELECT id, timestamp, motion, image_name, synced
                     FROM motion WHERE synced = 0 ORDER BY id ASC",
                )?;
                let rows = stmt.query_map([], motion_from_row)?;
                rows.map(|r| r.map(Record::Motion))
                    .collect::<std::result::Result<Vec<_>, _>>()?
            }
        };
        Ok(records)
    }

    /// Flag the given ids as delivered.
    ///
    /// Idempotent: ids that are already synced (or unknown) are ignored, and an
    /// empty slice is a no-op. Returns the number of rows that changed state.
    pub fn mark_synced(&self, kind: RecordKind, ids: &[i64]) -> Result<usize> {
        if ids.is_empty() {
            return Ok(0);
        }

        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let mut changed = 0;
        for chunk in ids.chunks(MARK_CHUNK) {
            let placeholders = vec!["?"; chunk.len()].join(", ");
            let sql = format!(
                "UPDATE {} SET synced = 1 WHERE synced = 0 AND id IN ({placeholders})",
                kind.local_table()
            );
            changed += tx.execute(&sql, params_from_iter(chunk.iter()))?;
        }
        tx.commit()?;
        Ok(changed)
    }

    /// Number of unsynced records per kind.
    pub fn pending_counts(&self) -> Result<PendingCounts> {
        let conn = self.lock()?;
        let count = |table: &str| -> Result<usize> {
            let n: i64 = conn.query_row(
                &format!("SELECT COUNT(*) FROM {table} WHERE synced = 0"),
                [],
                |row| row.get(0),
            )?;
            Ok(usize::try_from(n).unwrap_or(0))
        };
        Ok(PendingCounts {
            environment: count(RecordKind::Environment.local_table())?,
            motion: count(RecordKind::Motion.local_table())?,
        })
    }
}

#[cfg(test)]
#[path = "db_tests.rs"]
mod tests;
