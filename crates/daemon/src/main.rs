// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![deny(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

use std::fs;

use clap::Parser;
use domisafe::config::{resolve_config_path, resolve_state_dir};
use domisafe::{Cli, Command, Config, StatePaths};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    let paths = StatePaths::new(resolve_state_dir(cli.state_dir.clone()));
    setup_logging(&cli.command, &paths);

    let result = Config::load(&resolve_config_path(cli.config.clone()))
        .and_then(|config| domisafe::run(cli.command, config, paths));
    if let Err(e) = result {
        tracing::error!(error = %e, "command failed");
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

/// `run` logs to a per-run file under the state directory at `info`;
/// every other command logs to stderr at `warn`.
fn setup_logging(command: &Command, paths: &StatePaths) {
    let default_level = match command {
        Command::Run => "info",
        _ => "warn",
    };
    let filter = EnvFilter::try_from_env(domisafe::env::vars::RUST_LOG)
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    let log_file = match command {
        Command::Run => open_run_log(paths),
        _ => None,
    };

    if let Some(file) = log_file {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(file)
            .with_ansi(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

fn open_run_log(paths: &StatePaths) -> Option<fs::File> {
    let dir = paths.logs_dir();
    fs::create_dir_all(&dir).ok()?;
    let name = format!("run_{}.log", chrono::Local::now().format("%Y%m%d_%H%M%S"));
    fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join(name))
        .ok()
}
