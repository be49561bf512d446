// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for ds-core operations.

use thiserror::Error;

/// All possible errors that can occur in ds-core operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid record kind: '{0}'\n  hint: valid kinds are: environment, motion")]
    InvalidRecordKind(String),

    #[error("unknown feed: '{0}'")]
    UnknownFeed(String),

    #[error("feed '{0}' does not accept commands\n  hint: command feeds are: led-status, buzzer-status, motor-status, security-enabled")]
    NotACommandFeed(String),

    #[error("malformed payload for {feed}: '{payload}' is not an integer")]
    MalformedPayload { feed: String, payload: String },

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("corrupted data: {0}")]
    CorruptedData(String),

    #[error("local log lock poisoned")]
    LockPoisoned,
}

/// A specialized Result type for ds-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
