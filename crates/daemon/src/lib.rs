// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! domisafe - home security and environment monitoring agent.
//!
//! The agent samples temperature and humidity, watches a motion sensor, and
//! drives an alert light, alarm and response motor. Every observation lands
//! in the local log first ([`ds_core::LocalLog`]); the sync engine later
//! delivers it to the remote store, so network outages never lose data.
//!
//! # Main Components
//!
//! - [`sampler::EnvironmentSampler`] - periodic environment readings
//! - [`intrusion::IntrusionMonitor`] - the IDLE/ALERTING state machine
//! - [`channel`] - MQTT telemetry out, remote commands in
//! - [`sync::SyncEngine`] - at-least-once delivery to the remote store
//! - [`runner`] - periodic loops, single-instance lock and shutdown

mod cli;
mod commands;
pub mod env;

pub mod channel;
pub mod config;
pub mod context;
pub mod error;
pub mod hardware;
pub mod intrusion;
pub mod retry;
pub mod runner;
pub mod sampler;
pub mod sync;

#[cfg(test)]
mod test_helpers;

pub use cli::{Cli, Command, Device, Switch};
pub use config::{Config, StatePaths};
pub use error::{Error, Result};

use std::future::Future;

use ds_core::Feed;

use crate::hardware::Hardware;

/// Execute one CLI command.
pub fn run(command: Command, config: Config, paths: StatePaths) -> Result<()> {
    match command {
        Command::Run => block_on(runner::run_agent(config, paths, Hardware::simulated())),
        Command::Status { json } => commands::status::run(&paths, json),
        Command::Sync => block_on(commands::sync::run(&config, &paths)),
        Command::Control { device, state } => {
            block_on(commands::control::run(&config, device.feed(), state.is_on()))
        }
        Command::Security { state } => block_on(commands::control::run(
            &config,
            Feed::SecurityEnabled,
            state.is_on(),
        )),
        Command::History { kind, limit } => {
            block_on(commands::history::run(&config, kind, limit))
        }
    }
}

fn block_on<F: Future<Output = Result<()>>>(future: F) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| Error::Io(std::io::Error::other(format!("tokio: {}", e))))?;
    rt.block_on(future)
}
