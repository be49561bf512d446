// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use ds_core::{Feed, RecordKind};

const QUICKSTART_HELP: &str = "\
Get started:
  domisafe run                   Start the agent
  domisafe status                Show records waiting for sync
  domisafe security off          Disarm intrusion detection
  domisafe history motion -l 5   Show the latest motion events";

#[derive(Parser)]
#[command(name = "domisafe")]
#[command(about = "Home security and environment monitoring agent")]
#[command(version)]
#[command(after_help = QUICKSTART_HELP)]
pub struct Cli {
    /// Config file [default: $DOMISAFE_CONFIG or ./domisafe.toml]
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// State directory for the local log, captures and run logs
    #[arg(long, global = true, value_name = "DIR")]
    pub state_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the agent until interrupted
    Run,

    /// Show unsynced record counts from the local log
    Status {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Run a single sync cycle against the remote store
    Sync,

    /// Switch an actuator through the command channel
    #[command(after_help = "Examples:\n  \
        domisafe control led on        Turn the alert light on\n  \
        domisafe control motor off     Stop the response motor")]
    Control {
        /// Actuator to switch
        device: Device,

        /// Desired state
        state: Switch,
    },

    /// Arm or disarm intrusion detection through the command channel
    Security {
        /// Desired state
        state: Switch,
    },

    /// List the latest records in the remote store, newest first
    History {
        /// Record kind (environment, motion)
        #[arg(value_parser = parse_kind)]
        kind: RecordKind,

        /// Maximum rows to show
        #[arg(long, short, default_value_t = 10)]
        limit: u32,
    },
}

/// Remotely switchable actuator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Device {
    Led,
    Buzzer,
    Motor,
}

impl Device {
    /// Command feed controlling this actuator.
    pub fn feed(self) -> Feed {
        match self {
            Device::Led => Feed::LedStatus,
            Device::Buzzer => Feed::BuzzerStatus,
            Device::Motor => Feed::MotorStatus,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Switch {
    On,
    Off,
}

impl Switch {
    pub fn is_on(self) -> bool {
        matches!(self, Switch::On)
    }
}

fn parse_kind(s: &str) -> Result<RecordKind, String> {
    s.parse::<RecordKind>().map_err(|e| e.to_string())
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
