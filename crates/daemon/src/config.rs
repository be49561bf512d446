// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Agent configuration.
//!
//! Configuration is read from a TOML file (default `./domisafe.toml`). Every
//! key is optional; a missing file yields the defaults. Runtime state (local
//! log, captures, logs, lock file) lives under a separate state directory.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::env;
use crate::error::{Error, Result};

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "domisafe.toml";

const LOCAL_LOG_FILE: &str = "iot_data.db";
const CAPTURES_DIR_NAME: &str = "captures";
const LOGS_DIR_NAME: &str = "logs";
const LOCK_FILE_NAME: &str = "domisafe.lock";
const STATE_DIR_NAME: &str = "domisafe";

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Intrusion poll period, seconds.
    pub security_check_interval: u64,
    /// Environment sampling period, seconds.
    pub env_interval: u64,
    /// Sync engine period, seconds.
    pub sync_interval: u64,
    /// When false the sync loop is not started.
    pub cloud_sync_enabled: bool,
    /// When false no capture is attempted on intrusion.
    pub camera_enabled: bool,
    /// Identifier stamped on every remote row.
    pub device_id: String,
    pub mqtt: MqttConfig,
    pub cloud: CloudConfig,
    pub intrusion: IntrusionConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            security_check_interval: 5,
            env_interval: 30,
            sync_interval: 60,
            cloud_sync_enabled: true,
            camera_enabled: true,
            device_id: "pi_home_security".to_string(),
            mqtt: MqttConfig::default(),
            cloud: CloudConfig::default(),
            intrusion: IntrusionConfig::default(),
        }
    }
}

/// Broker connection settings for the command channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MqttConfig {
    pub broker: String,
    pub port: u16,
    /// Broker account; also the topic namespace.
    pub username: String,
    pub key: String,
    pub connect_timeout_secs: u64,
}

impl Default for MqttConfig {
    fn default() -> Self {
        MqttConfig {
            broker: "io.adafruit.com".to_string(),
            port: 8883,
            username: String::new(),
            key: String::new(),
            connect_timeout_secs: 10,
        }
    }
}

impl MqttConfig {
    /// Returns true if broker credentials are present.
    pub fn is_configured(&self) -> bool {
        !self.username.is_empty() && !self.key.is_empty()
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

/// Remote store settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudConfig {
    /// Postgres connection URL. Empty disables the remote store.
    pub database_url: String,
    pub connect_timeout_secs: u64,
}

impl Default for CloudConfig {
    fn default() -> Self {
        CloudConfig {
            database_url: String::new(),
            connect_timeout_secs: 10,
        }
    }
}

impl CloudConfig {
    pub fn is_configured(&self) -> bool {
        !self.database_url.trim().is_empty()
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

/// Intrusion response timings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntrusionConfig {
    /// How long the alarm sounds once motion is seen.
    pub dwell_ms: u64,
    /// How long the response motor runs per detection.
    pub motor_pulse_ms: u64,
    /// Start a new motor pulse even if the previous one is still running.
    pub allow_overlapping_pulses: bool,
}

impl Default for IntrusionConfig {
    fn default() -> Self {
        IntrusionConfig {
            dwell_ms: 800,
            motor_pulse_ms: 2000,
            allow_overlapping_pulses: true,
        }
    }
}

impl IntrusionConfig {
    pub fn dwell(&self) -> Duration {
        Duration::from_millis(self.dwell_ms)
    }

    pub fn motor_pulse(&self) -> Duration {
        Duration::from_millis(self.motor_pulse_ms)
    }
}

impl Config {
    /// Loads configuration from `path`.
    ///
    /// A missing file is not an error: defaults are returned and a warning is
    /// logged. A file that exists but cannot be read or parsed is.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::warn!(
                path = %path.display(),
                "config file not found, using defaults"
            );
            return Ok(Config::default());
        }

        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config: {}", e)))?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values the periodic loops cannot run with.
    pub fn validate(&self) -> Result<()> {
        let periods = [
            ("security_check_interval", self.security_check_interval),
            ("env_interval", self.env_interval),
            ("sync_interval", self.sync_interval),
        ];
        for (name, value) in periods {
            if value == 0 {
                return Err(Error::Config(format!("{name} must be at least 1 second")));
            }
        }
        if self.device_id.trim().is_empty() {
            return Err(Error::Config("device_id cannot be empty".to_string()));
        }
        Ok(())
    }

    pub fn security_check_period(&self) -> Duration {
        Duration::from_secs(self.security_check_interval)
    }

    pub fn env_period(&self) -> Duration {
        Duration::from_secs(self.env_interval)
    }

    pub fn sync_period(&self) -> Duration {
        Duration::from_secs(self.sync_interval)
    }
}

/// Resolve the config file path: explicit flag, then `DOMISAFE_CONFIG`,
/// then `./domisafe.toml`.
pub fn resolve_config_path(flag: Option<PathBuf>) -> PathBuf {
    flag.or_else(env::config_path)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
}

/// Resolve the state directory from the flag and the environment.
pub fn resolve_state_dir(flag: Option<PathBuf>) -> PathBuf {
    state_dir_from(
        flag,
        env::state_dir(),
        env::xdg_state_home(),
        dirs::home_dir(),
    )
}

/// State directory precedence: flag, `DOMISAFE_STATE_DIR`,
/// `$XDG_STATE_HOME/domisafe`, `~/.local/state/domisafe`.
pub fn state_dir_from(
    flag: Option<PathBuf>,
    env_dir: Option<PathBuf>,
    xdg_state_home: Option<PathBuf>,
    home: Option<PathBuf>,
) -> PathBuf {
    if let Some(dir) = flag.or(env_dir) {
        return dir;
    }
    if let Some(xdg) = xdg_state_home {
        return xdg.join(STATE_DIR_NAME);
    }
    home.map(|h| h.join(".local/state").join(STATE_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from(".local/state").join(STATE_DIR_NAME))
}

/// Well-known locations inside the state directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatePaths {
    root: PathBuf,
}

impl StatePaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        StatePaths { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn local_log(&self) -> PathBuf {
        self.root.join(LOCAL_LOG_FILE)
    }

    pub fn captures_dir(&self) -> PathBuf {
        self.root.join(CAPTURES_DIR_NAME)
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.root.join(LOGS_DIR_NAME)
    }

    pub fn lock_file(&self) -> PathBuf {
        self.root.join(LOCK_FILE_NAME)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
