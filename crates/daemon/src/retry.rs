// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Bounded retry for local log appends.

use std::time::Duration;

use ds_core::RecordKind;

/// Attempts made before an observation is given up.
pub const APPEND_ATTEMPTS: u32 = 3;
/// Pause between attempts.
pub const APPEND_RETRY_DELAY: Duration = Duration::from_millis(100);

/// Run `append` until it succeeds or the attempts run out.
///
/// `append` must write the same payload every time. Returns the new record id,
/// or `None` once every attempt has failed; the last failure is logged at
/// error level.
pub async fn append_durably<F>(kind: RecordKind, mut append: F) -> Option<i64>
where
    F: FnMut() -> ds_core::Result<i64>,
{
    for attempt in 1..=APPEND_ATTEMPTS {
        match append() {
            Ok(id) => return Some(id),
            Err(e) if attempt < APPEND_ATTEMPTS => {
                tracing::warn!(kind = kind.as_str(), attempt, error = %e, "local log append failed, retrying");
                tokio::time::sleep(APPEND_RETRY_DELAY).await;
            }
            Err(e) => {
                tracing::error!(
                    kind = kind.as_str(),
                    attempts = APPEND_ATTEMPTS,
                    error = %e,
                    "local log append failed, observation lost"
                );
            }
        }
    }
    None
}

#[cfg(test)]
#[path = "retry_tests.rs"]
mod tests;
