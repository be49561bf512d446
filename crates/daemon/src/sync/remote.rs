// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Remote store abstraction.

use std::future::Future;
use std::pin::Pin;

use ds_core::Record;

/// Error type for remote store operations.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    /// No remote store is configured.
    #[error("remote store not configured\n  hint: set cloud.database_url in the config file")]
    NotConfigured,

    /// Operation attempted without a connection.
    #[error("not connected")]
    NotConnected,

    /// Connection attempt failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Connection dropped during an operation. The handle is invalidated.
    #[error("connection lost: {0}")]
    ConnectionLost(String),

    /// The store refused the row; the connection is still usable.
    #[error("rejected: {0}")]
    Rejected(String),
}

/// Result type for remote store operations.
pub type RemoteResult<T> = Result<T, RemoteError>;

/// Boxed future returned by [`RemoteStore`] methods.
pub type RemoteFuture<'a, T> = Pin<Box<dyn Future<Output = RemoteResult<T>> + Send + 'a>>;

/// Durable remote destination for local records.
///
/// Inserts must be idempotent on `(device_id, timestamp)`: sending the same
/// record twice leaves one row.
pub trait RemoteStore: Send {
    /// Establish a connection.
    fn connect(&mut self) -> RemoteFuture<'_, ()>;

    /// Drop the connection, if any.
    fn disconnect(&mut self) -> RemoteFuture<'_, ()>;

    /// Insert one record.
    ///
    /// Returns `Ok` only once the row is durably stored or was already present.
    fn insert<'a>(&'a mut self, record: &'a Record) -> RemoteFuture<'a, ()>;

    /// Check if connected.
    fn is_connected(&self) -> bool;
}
