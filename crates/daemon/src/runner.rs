// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Agent lifecycle.
//!
//! `run` wires the device context, local log, command channel and the three
//! periodic loops (sampler, intrusion monitor, sync engine), then waits for
//! a shutdown signal. Every loop watches one cancellation token; after it is
//! cancelled the loops get a bounded grace period before being aborted.

use std::fs::{self, File};
use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use ds_core::LocalLog;
use tokio::task::JoinSet;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::channel::{MqttChannel, NullPublisher, Publisher};
use crate::config::{Config, StatePaths};
use crate::context::DeviceContext;
use crate::error::{Error, Result};
use crate::hardware::{FallbackSensor, Hardware};
use crate::intrusion::IntrusionMonitor;
use crate::sampler::EnvironmentSampler;
use crate::sync::{PostgresStore, RemoteStore, SyncEngine};

/// How long loops get to finish their current iteration on shutdown.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// One unit of periodic work.
pub trait PeriodicTask: Send {
    fn name(&self) -> &'static str;

    /// Run one iteration. Failures are handled inside; a tick never ends
    /// the loop.
    fn tick(&mut self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>>;
}

impl<R: RemoteStore> PeriodicTask for SyncEngine<R> {
    fn name(&self) -> &'static str {
        "sync engine"
    }

    fn tick(&mut self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(async move {
            self.run_cycle().await;
        })
    }
}

/// Tick `task` every `period` until `cancel` fires.
///
/// The first tick runs immediately. Cancellation is checked between ticks,
/// so an iteration in progress always completes.
pub async fn run_periodic<T: PeriodicTask>(mut task: T, period: Duration, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tracing::info!(task = task.name(), period_ms = period.as_millis() as u64, "loop started");

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = interval.tick() => {}
        }
        task.tick().await;
    }

    tracing::info!(task = task.name(), "loop stopped");
}

/// Take the single-instance lock. Held until the returned file is dropped.
pub fn acquire_lock(lock_path: &Path) -> Result<File> {
    use fs2::FileExt;

    let file = fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(false)
        .open(lock_path)?;
    file.try_lock_exclusive()
        .map_err(|_| Error::AlreadyRunning(lock_path.to_path_buf()))?;
    Ok(file)
}

/// Run the agent until SIGINT or SIGTERM.
pub async fn run_agent(config: Config, paths: StatePaths, hardware: Hardware) -> Result<()> {
    run_agent_until(config, paths, hardware, shutdown_signal()).await
}

/// Run the agent until `shutdown` resolves.
pub async fn run_agent_until<F>(
    config: Config,
    paths: StatePaths,
    hardware: Hardware,
    shutdown: F,
) -> Result<()>
where
    F: Future<Output = ()>,
{
    fs::create_dir_all(paths.root())?;
    let _lock = acquire_lock(&paths.lock_file())?;

    let log = Arc::new(LocalLog::open(&paths.local_log())?);
    let ctx = Arc::new(DeviceContext::new(Arc::clone(&hardware.actuators)));
    tracing::info!(
        state_dir = %paths.root().display(),
        device_id = %config.device_id,
        "agent starting"
    );

    // The channel outlives the loops so it can be closed cleanly after them.
    let channel_cancel = CancellationToken::new();
    let channel = if config.mqtt.is_configured() {
        let channel =
            MqttChannel::connect(&config.mqtt, Some(Arc::clone(&ctx)), channel_cancel.clone()).await;
        Some(Arc::new(channel))
    } else {
        tracing::warn!("mqtt username/key not set, running without command channel");
        None
    };
    let publisher: Arc<dyn Publisher> = match &channel {
        Some(channel) => Arc::clone(channel) as Arc<dyn Publisher>,
        None => Arc::new(NullPublisher),
    };

    let cancel = CancellationToken::new();
    let mut tasks = JoinSet::new();

    let sampler = EnvironmentSampler::new(
        FallbackSensor::new(hardware.environment.clone()),
        Arc::clone(&log),
        Arc::clone(&publisher),
    );
    tasks.spawn(run_periodic(sampler, config.env_period(), cancel.clone()));

    let camera = config.camera_enabled.then(|| Arc::clone(&hardware.camera));
    let monitor = IntrusionMonitor::new(
        Arc::clone(&ctx),
        Arc::clone(&hardware.motion),
        camera,
        Arc::clone(&log),
        Arc::clone(&publisher),
        paths.captures_dir(),
        config.intrusion.clone(),
    );
    tasks.spawn(run_periodic(monitor, config.security_check_period(), cancel.clone()));

    if !config.cloud_sync_enabled {
        tracing::info!("cloud sync disabled, records stay local");
    } else if !config.cloud.is_configured() {
        tracing::warn!("cloud sync enabled but cloud.database_url is empty, records stay local");
    } else {
        let engine = SyncEngine::new(Arc::clone(&log), PostgresStore::from_config(&config));
        tasks.spawn(run_periodic(engine, config.sync_period(), cancel.clone()));
    }

    shutdown.await;
    tracing::info!("shutdown requested");
    cancel.cancel();
    drain(&mut tasks, SHUTDOWN_GRACE).await;

    ctx.set_led(false);
    ctx.set_buzzer(false);
    ctx.set_motor(false);

    drop(publisher);
    if let Some(channel) = channel {
        match Arc::try_unwrap(channel) {
            Ok(channel) => channel.close().await,
            Err(_) => tracing::debug!("channel still shared, cancelling event loop"),
        }
    }
    channel_cancel.cancel();

    tracing::info!("agent stopped");
    Ok(())
}

/// Wait for every loop to exit, aborting whatever is left after `grace`.
async fn drain(tasks: &mut JoinSet<()>, grace: Duration) {
    let wait = async {
        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                tracing::error!(error = %e, "loop task failed");
            }
        }
    };
    let finished = tokio::time::timeout(grace, wait).await.is_ok();
    if !finished {
        tracing::warn!(grace_secs = grace.as_secs(), "loops did not stop in time, aborting");
        tasks.abort_all();
    }
}

/// Resolves on SIGINT, or SIGTERM on unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
