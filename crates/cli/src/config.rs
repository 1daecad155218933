// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Project configuration management.
//!
//! Configuration is stored in `.liftlog/config.toml` and includes:
//! - `owner`: The user id every workout logged from this device belongs to
//! - `remote`: Optional hosted backend to sync with (absent = local-only)

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};

const WORK_DIR_NAME: &str = ".liftlog";
const CONFIG_FILE_NAME: &str = "config.toml";
const DB_FILE_NAME: &str = "workouts.db";
const GITIGNORE_FILE_NAME: &str = ".gitignore";

/// Project configuration stored in `.liftlog/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Owner id attached to every workout.
    pub owner: String,
    /// Remote sync configuration (optional - if absent, runs in local-only mode).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote: Option<RemoteConfig>,
}

/// Remote sync configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// WebSocket URL of the backend: `ws://...` or `wss://...`.
    pub url: String,
    /// Max time to wait for a reply to a single request in milliseconds (default: 10000).
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Max time to wait for a connection in seconds (default: 5).
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Interval between queue drains in `sync --watch` in seconds (default: 30).
    #[serde(default = "default_sync_interval_secs")]
    pub sync_interval_secs: u64,
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

fn default_connect_timeout_secs() -> u64 {
    5
}

fn default_sync_interval_secs() -> u64 {
    30
}

impl RemoteConfig {
    /// Creates a remote config with default timeouts.
    pub fn new(url: impl Into<String>) -> Self {
        RemoteConfig {
            url: url.into(),
            request_timeout_ms: default_request_timeout_ms(),
            connect_timeout_secs: default_connect_timeout_secs(),
            sync_interval_secs: default_sync_interval_secs(),
        }
    }

    /// Validates that the URL is a WebSocket URL.
    ///
    /// Returns an error message if the URL is invalid.
    pub fn validate_url(&self) -> Option<String> {
        let rest = self
            .url
            .strip_prefix("ws://")
            .or_else(|| self.url.strip_prefix("wss://"));
        match rest {
            Some(host) if !host.is_empty() => None,
            Some(_) => Some(format!("invalid remote URL '{}': missing host", self.url)),
            None => Some(format!(
                "invalid remote URL '{}': must be ws:// or wss://",
                self.url
            )),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Drain period, never shorter than one second.
    pub fn sync_interval(&self) -> Duration {
        Duration::from_secs(self.sync_interval_secs.max(1))
    }
}

impl Config {
    /// Creates a new local-only config for the given owner.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the owner id is blank.
    pub fn new(owner: impl Into<String>) -> Result<Self> {
        let owner = owner.into();
        if owner.trim().is_empty() {
            return Err(Error::InvalidInput("owner cannot be empty".to_string()));
        }
        Ok(Config {
            owner,
            remote: None,
        })
    }

    /// Attaches a remote, validating its URL.
    pub fn with_remote(mut self, url: &str) -> Result<Self> {
        let remote = RemoteConfig::new(url);
        if let Some(msg) = remote.validate_url() {
            return Err(Error::Config(msg));
        }
        self.remote = Some(remote);
        Ok(self)
    }

    /// Loads configuration from the given `.liftlog/` directory.
    pub fn load(work_dir: &Path) -> Result<Self> {
        let config_path = work_dir.join(CONFIG_FILE_NAME);
        let content = fs::read_to_string(&config_path)
            .map_err(|e| Error::Config(format!("failed to read config: {}", e)))?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;
        if let Some(msg) = config.remote.as_ref().and_then(RemoteConfig::validate_url) {
            return Err(Error::Config(msg));
        }
        Ok(config)
    }

    /// Returns true if remote sync is configured.
    pub fn is_remote_mode(&self) -> bool {
        self.remote.is_some()
    }

    /// Returns the remote URL if configured.
    pub fn remote_url(&self) -> Option<&str> {
        self.remote.as_ref().map(|r| r.url.as_str())
    }

    /// Saves configuration to the given `.liftlog/` directory.
    pub fn save(&self, work_dir: &Path) -> Result<()> {
        let config_path = work_dir.join(CONFIG_FILE_NAME);
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("failed to serialize config: {}", e)))?;
        fs::write(&config_path, content)?;
        Ok(())
    }
}

/// Find the .liftlog directory by walking up from the current directory
pub fn find_work_dir() -> Result<PathBuf> {
    find_work_dir_from(&std::env::current_dir()?)
}

/// Find the .liftlog directory by walking up from `start`
pub fn find_work_dir_from(start: &Path) -> Result<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        let work_dir = current.join(WORK_DIR_NAME);
        if work_dir.is_dir() {
            return Ok(work_dir);
        }
        if !current.pop() {
            return Err(Error::NotInitialized);
        }
    }
}

/// Get the database path inside a work directory
pub fn get_db_path(work_dir: &Path) -> PathBuf {
    work_dir.join(DB_FILE_NAME)
}

/// Initialize a new .liftlog directory at the given path
pub fn init_work_dir(path: &Path, owner: &str, remote: Option<&str>) -> Result<PathBuf> {
    let work_dir = path.join(WORK_DIR_NAME);

    if work_dir.exists() {
        return Err(Error::AlreadyInitialized(work_dir.display().to_string()));
    }

    let mut config = Config::new(owner)?;
    if let Some(url) = remote {
        config = config.with_remote(url)?;
    }

    fs::create_dir_all(&work_dir)?;
    config.save(&work_dir)?;
    write_gitignore(&work_dir)?;

    Ok(work_dir)
}

/// Write a .gitignore file to the work directory.
///
/// The database and its WAL files are device-local state.
pub fn write_gitignore(work_dir: &Path) -> Result<()> {
    let gitignore_path = work_dir.join(GITIGNORE_FILE_NAME);
    fs::write(
        &gitignore_path,
        "# Device-local store\nworkouts.db\nworkouts.db-wal\nworkouts.db-shm\n",
    )?;
    Ok(())
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
