// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Cloud sync: drains the local log into the remote store.
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  LocalLog   │────►│ SyncEngine  │────►│ RemoteStore │
//! │ (unsynced)  │◄────│             │     │  (trait)    │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!    mark_synced
//! ```
//!
//! - At-least-once delivery; the remote side ignores duplicates
//! - Records are marked synced only after remote acknowledgment
//! - Injectable remote store trait for testing

mod engine;
mod postgres;
mod remote;

pub use engine::{SyncEngine, SyncReport, SyncSnapshot, SyncStatus};
pub use postgres::PostgresStore;
pub use remote::{RemoteError, RemoteFuture, RemoteResult, RemoteStore};
