// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

pub mod control;
pub mod history;
pub mod status;
pub mod sync;

use crate::config::Config;
use crate::error::Result;
use crate::sync::RemoteError;

/// Fail early when no remote store is configured.
pub(crate) fn require_cloud(config: &Config) -> Result<()> {
    if config.cloud.is_configured() {
        Ok(())
    } else {
        Err(RemoteError::NotConfigured.into())
    }
}
