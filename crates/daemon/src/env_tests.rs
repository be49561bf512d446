// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

/// Serializes tests that touch process-wide environment variables.
static ENV_LOCK: Mutex<()> = Mutex::new(());

#[test]
fn constants_match_env_var_names() {
    assert_eq!(vars::DOMISAFE_STATE_DIR, "DOMISAFE_STATE_DIR");
    assert_eq!(vars::DOMISAFE_CONFIG, "DOMISAFE_CONFIG");
    assert_eq!(vars::XDG_STATE_HOME, "XDG_STATE_HOME");
    assert_eq!(vars::RUST_LOG, "RUST_LOG");
}

#[test]
fn state_dir_returns_path_when_set() {
    let _guard = EnvGuard::set(vars::DOMISAFE_STATE_DIR, "/custom/state");
    assert_eq!(state_dir(), Some(PathBuf::from("/custom/state")));
}

#[test]
fn state_dir_returns_none_when_unset() {
    let _guard = EnvGuard::remove(vars::DOMISAFE_STATE_DIR);
    assert_eq!(state_dir(), None);
}

#[test]
fn state_dir_ignores_empty_value() {
    let _guard = EnvGuard::set(vars::DOMISAFE_STATE_DIR, "");
    assert_eq!(state_dir(), None);
}

#[test]
fn config_path_returns_path_when_set() {
    let _guard = EnvGuard::set(vars::DOMISAFE_CONFIG, "/etc/domisafe.toml");
    assert_eq!(config_path(), Some(PathBuf::from("/etc/domisafe.toml")));
}

#[test]
fn xdg_state_home_returns_none_when_unset() {
    let _guard = EnvGuard::remove(vars::XDG_STATE_HOME);
    assert_eq!(xdg_state_home(), None);
}

/// RAII guard that sets/removes an env var and restores it on drop.
struct EnvGuard {
    key: &'static str,
    original: Option<String>,
    _lock: MutexGuard<'static, ()>,
}

impl EnvGuard {
    fn set(key: &'static str, value: &str) -> Self {
        let lock = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let original = std::env::var(key).ok();
        std::env::set_var(key, value);
        Self {
            key,
            original,
            _lock: lock,
        }
    }

    fn remove(key: &'static str) -> Self {
        let lock = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let original = std::env::var(key).ok();
        std::env::remove_var(key);
        Self {
            key,
            original,
            _lock: lock,
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match &self.original {
            Some(val) => std::env::set_var(self.key, val),
            None => std::env::remove_var(self.key),
        }
    }
}
