//! Configuration system for Outpost.
//!
//! Resolution order: environment variables → config file → defaults.
//!
//! Config file location:
//!   1. $OUTPOST_CONFIG (explicit override)
//!   2. $XDG_CONFIG_HOME/outpost/config.toml
//!   3. ~/.config/outpost/config.toml

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutpostConfig {
    pub network: NetworkConfig,
    pub updates: UpdateConfig,
    pub bans: BanConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// TCP port for the HTTP API.
    pub api_port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateConfig {
    /// Maximum number of update downloads in flight at once.
    pub max_concurrent: usize,
    /// Seconds a download reservation lives without an explicit clear.
    pub reservation_ttl_secs: u64,
    /// Maximum seconds a request may wait for a free slot. 0 = wait forever.
    pub max_wait_secs: u64,
    /// Directory holding the per-platform update archives.
    pub package_root: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BanConfig {
    /// Public addresses whose requests are rejected and whose agents
    /// are told to uninstall.
    pub banned_addresses: Vec<String>,
}

// ── Defaults ──────────────────────────────────────────────────────────────────

impl Default for OutpostConfig {
    fn default() -> Self {
        Self {
            network: NetworkConfig::default(),
            updates: UpdateConfig::default(),
            bans: BanConfig::default(),
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self { api_port: 7420 }
    }
}

impl Default for UpdateConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 10,
            reservation_ttl_secs: 180,
            max_wait_secs: 0,
            package_root: data_dir().join("content"),
        }
    }
}

impl Default for BanConfig {
    fn default() -> Self {
        Self {
            banned_addresses: Vec::new(),
        }
    }
}

// ── Path helpers ──────────────────────────────────────────────────────────────

fn config_dir() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| dirs_or_home().join(".config"))
        .join("outpost")
}

pub fn data_dir() -> PathBuf {
    std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| dirs_or_home().join(".local").join("share"))
        .join("outpost")
}

fn dirs_or_home() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/tmp"))
}

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {0}: {1}")]
    ReadFailed(PathBuf, std::io::Error),
    #[error("failed to parse {0}: {1}")]
    ParseFailed(PathBuf, toml::de::Error),
    #[error("failed to write {0}: {1}")]
    WriteFailed(PathBuf, std::io::Error),
    #[error("failed to serialize: {0}")]
    SerializeFailed(toml::ser::Error),
}

// ── Loading ───────────────────────────────────────────────────────────────────

impl OutpostConfig {
    /// Load config: env vars → file → defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::file_path();
        let mut config = if path.exists() {
            let text = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::ReadFailed(path.clone(), e))?;
            toml::from_str(&text).map_err(|e| ConfigError::ParseFailed(path.clone(), e))?
        } else {
            OutpostConfig::default()
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Config file path.
    pub fn file_path() -> PathBuf {
        std::env::var("OUTPOST_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| config_dir().join("config.toml"))
    }

    /// Write default config if none exists. Returns the path.
    pub fn write_default_if_missing() -> Result<PathBuf, ConfigError> {
        let path = Self::file_path();
        if !path.exists() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| ConfigError::WriteFailed(path.clone(), e))?;
            }
            let text = toml::to_string_pretty(&OutpostConfig::default())
                .map_err(ConfigError::SerializeFailed)?;
            std::fs::write(&path, text)
                .map_err(|e| ConfigError::WriteFailed(path.clone(), e))?;
        }
        Ok(path)
    }

    /// Apply OUTPOST_* env var overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("OUTPOST_NETWORK__API_PORT") {
            if let Ok(p) = v.parse() {
                self.network.api_port = p;
            }
        }
        if let Ok(v) = std::env::var("OUTPOST_UPDATES__MAX_CONCURRENT") {
            if let Ok(n) = v.parse() {
                self.updates.max_concurrent = n;
            }
        }
        if let Ok(v) = std::env::var("OUTPOST_UPDATES__MAX_WAIT_SECS") {
            if let Ok(n) = v.parse() {
                self.updates.max_wait_secs = n;
            }
        }
        if let Ok(v) = std::env::var("OUTPOST_UPDATES__PACKAGE_ROOT") {
            self.updates.package_root = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("OUTPOST_BANS__BANNED_ADDRESSES") {
            self.bans.banned_addresses = v
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
        }
    }
}
