// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use thiserror::Error;

use crate::hardware::HardwareError;
use crate::sync::RemoteError;

/// All possible errors that can occur in the domisafe agent.
#[derive(Debug, Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("local log error: {0}")]
    Core(#[from] ds_core::Error),

    #[error("remote store error: {0}")]
    Remote(#[from] RemoteError),

    #[error("hardware error: {0}")]
    Hardware(#[from] HardwareError),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("command channel error: {0}")]
    Channel(String),

    #[error("another domisafe instance is already running\n  hint: lock held at {}", .0.display())]
    AlreadyRunning(PathBuf),
}

/// A specialized Result type for domisafe operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
