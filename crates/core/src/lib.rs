// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! ds-core: Shared library for the domisafe device agent
//!
//! This crate provides the observation records, the durable local log, and
//! the command channel feed vocabulary used by the domisafe daemon.

pub mod db;
pub mod error;
pub mod feed;
pub mod record;

pub use db::LocalLog;
pub use error::{Error, Result};
pub use feed::{flag, Command, Feed};
pub use record::{
    EnvironmentReading, EnvironmentRecord, MotionEvent, MotionRecord, PendingCounts, Record,
    RecordKind,
};
