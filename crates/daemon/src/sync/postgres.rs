// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Postgres-backed remote store.

use std::time::Duration;

use chrono::{DateTime, Utc};
use ds_core::{EnvironmentRecord, MotionRecord, Record, RecordKind};
use sqlx::postgres::{PgPool, PgPoolOptions};

use super::remote::{RemoteError, RemoteFuture, RemoteResult, RemoteStore};
use crate::config::Config;

/// Remote tables, created if absent. `(device_id, timestamp)` is the
/// idempotency key for re-sent records.
const SCHEMA: [&str; 2] = [
    r#"CREATE TABLE IF NOT EXISTS environment (
    id BIGSERIAL PRIMARY KEY,
    timestamp TIMESTAMPTZ NOT NULL,
    temperature DOUBLE PRECISION NOT NULL,
    humidity DOUBLE PRECISION NOT NULL,
    device_id TEXT NOT NULL DEFAULT 'pi_home_security',
    UNIQUE (device_id, timestamp)
)"#,
    r#"CREATE TABLE IF NOT EXISTS motion_events (
    id BIGSERIAL PRIMARY KEY,
    timestamp TIMESTAMPTZ NOT NULL,
    motion BOOLEAN NOT NULL DEFAULT TRUE,
    image_name TEXT,
    device_id TEXT NOT NULL DEFAULT 'pi_home_security',
    UNIQUE (device_id, timestamp)
)"#,
];

const INSERT_ENVIRONMENT: &str = "INSERT INTO environment (timestamp, temperature, humidity, device_id)
     VALUES ($1, $2, $3, $4)
     ON CONFLICT (device_id, timestamp) DO NOTHING";

const INSERT_MOTION: &str = "INSERT INTO motion_events (timestamp, motion, image_name, device_id)
     VALUES ($1, $2, $3, $4)
     ON CONFLICT (device_id, timestamp) DO NOTHING";

const MAX_CONNECTIONS: u32 = 2;

/// Remote store backed by a Postgres pool.
///
/// The pool is dropped when a connection-level error is seen, so the next
/// sync cycle reconnects from scratch.
pub struct PostgresStore {
    database_url: String,
    device_id: String,
    connect_timeout: Duration,
    pool: Option<PgPool>,
}

impl PostgresStore {
    pub fn new(database_url: String, device_id: String, connect_timeout: Duration) -> Self {
        PostgresStore {
            database_url,
            device_id,
            connect_timeout,
            pool: None,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.cloud.database_url.clone(),
            config.device_id.clone(),
            config.cloud.connect_timeout(),
        )
    }

    fn pool(&self) -> RemoteResult<PgPool> {
        self.pool.clone().ok_or(RemoteError::NotConnected)
    }

    /// Map a driver error, dropping the pool if the connection is gone.
    fn fail(&mut self, err: sqlx::Error) -> RemoteError {
        let err = classify(err);
        if matches!(err, RemoteError::ConnectionLost(_)) {
            self.pool = None;
        }
        err
    }

    async fn connect_inner(&mut self) -> RemoteResult<()> {
        if self.database_url.trim().is_empty() {
            return Err(RemoteError::NotConfigured);
        }

        let connect = PgPoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .acquire_timeout(self.connect_timeout)
            .connect(&self.database_url);
        let pool = tokio::time::timeout(self.connect_timeout, connect)
            .await
            .map_err(|_| RemoteError::ConnectionFailed("timed out".to_string()))?
            .map_err(|e| RemoteError::ConnectionFailed(e.to_string()))?;

        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&pool)
                .await
                .map_err(|e| RemoteError::ConnectionFailed(format!("schema setup: {e}")))?;
        }

        self.pool = Some(pool);
        Ok(())
    }

    async fn insert_inner(&mut self, record: &Record) -> RemoteResult<()> {
        let pool = self.pool()?;
        let result = match record {
            Record::Environment(r) => {
                sqlx::query(INSERT_ENVIRONMENT)
                    .bind(r.timestamp)
                    .bind(r.temperature)
                    .bind(r.humidity)
                    .bind(&self.device_id)
                    .execute(&pool)
                    .await
            }
            Record::Motion(r) => {
                sqlx::query(INSERT_MOTION)
                    .bind(r.timestamp)
                    .bind(r.motion)
                    .bind(r.image_name.as_deref())
                    .bind(&self.device_id)
                    .execute(&pool)
                    .await
            }
        };
        result.map(|_| ()).map_err(|e| self.fail(e))
    }

    /// Latest remote rows of `kind` for this device, newest first.
    pub async fn latest(&mut self, kind: RecordKind, limit: u32) -> RemoteResult<Vec<Record>> {
        let pool = self.pool()?;
        let limit = i64::from(limit);
        let rows: Result<Vec<Record>, sqlx::Error> = match kind {
            RecordKind::Environment => sqlx::query_as::<_, (i64, DateTime<Utc>, f64, f64)>(
                "SELECT id, timestamp, temperature, humidity FROM environment
                 WHERE device_id = $1 ORDER BY timestamp DESC LIMIT $2",
            )
            .bind(&self.device_id)
            .bind(limit)
            .fetch_all(&pool)
            .await
            .map(|rows| {
                rows.into_iter()
                    .map(|(id, timestamp, temperature, humidity)| {
                        Record::Environment(EnvironmentRecord {
                            id,
                            timestamp,
                            temperature,
                            humidity,
                            synced: true,
                        })
                    })
                    .collect()
            }),
            RecordKind::Motion => sqlx::query_as::<_, (i64, DateTime<Utc>, bool, Option<String>)>(
                "SELECT id, timestamp, motion, image_name FROM motion_events
                 WHERE device_id = $1 ORDER BY timestamp DESC LIMIT $2",
            )
            .bind(&self.device_id)
            .bind(limit)
            .fetch_all(&pool)
            .await
            .map(|rows| {
                rows.into_iter()
                    .map(|(id, timestamp, motion, image_name)| {
                        Record::Motion(MotionRecord {
                            id,
                            timestamp,
                            motion,
                            image_name,
                            synced: true,
                        })
                    })
                    .collect()
            }),
        };
        rows.map_err(|e| self.fail(e))
    }
}

impl RemoteStore for PostgresStore {
    fn connect(&mut self) -> RemoteFuture<'_, ()> {
        Box::pin(self.connect_inner())
    }

    fn disconnect(&mut self) -> RemoteFuture<'_, ()> {
        Box::pin(async move {
            if let Some(pool) = self.pool.take() {
                pool.close().await;
            }
            Ok(())
        })
    }

    fn insert<'a>(&'a mut self, record: &'a Record) -> RemoteFuture<'a, ()> {
        Box::pin(self.insert_inner(record))
    }

    fn is_connected(&self) -> bool {
        self.pool.as_ref().is_some_and(|pool| !pool.is_closed())
    }
}

/// Split driver errors into "row refused" and "connection gone".
pub(crate) fn classify(err: sqlx::Error) -> RemoteError {
    match err {
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::Protocol(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => RemoteError::ConnectionLost(err.to_string()),
        other => RemoteError::Rejected(other.to_string()),
    }
}

#[cfg(test)]
#[path = "postgres_tests.rs"]
mod tests;
