//! Configuration system for game-host
//!
//! Reads config from ~/.config/game-host/config.toml

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use game_host_vfs::Options;
use serde::{Deserialize, Serialize};

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

/// Where files and records live
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Root directory served as the remote file store
    pub root: PathBuf,
    /// JSON record snapshot (games, turns, tools)
    pub records: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        let base = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("game-host");
        Self {
            root: base.join("files"),
            records: base.join("records.json"),
        }
    }
}

/// Namespace tuning
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamespaceConfig {
    pub history_start_turn: u32,
    pub max_depth: usize,
}

impl Default for NamespaceConfig {
    fn default() -> Self {
        let options = Options::default();
        Self {
            history_start_turn: options.history_start_turn,
            max_depth: options.max_depth,
        }
    }
}

/// Full application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub namespace: NamespaceConfig,
}

const DEFAULT_CONFIG: &str = r#"# game-host Configuration

[server]
bind = "127.0.0.1"
port = 8080

# [storage]
# root = "/srv/game-host/files"
# records = "/srv/game-host/records.json"

[namespace]
# first turn published under history/
history_start_turn = 10
max_depth = 16
"#;

impl Config {
    /// Load configuration from default path
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::default_config_path())
    }

    /// Get default config path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("game-host")
            .join("config.toml")
    }

    /// Load from a specific path; a missing file gives the defaults
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Invalid config file {}", path.display()))
    }

    /// Create default config file if it doesn't exist
    pub fn create_default_if_missing() -> std::io::Result<()> {
        write_default_if_missing(&Self::default_config_path())
    }

    /// Namespace options for the service root
    pub const fn options(&self) -> Options {
        Options {
            history_start_turn: self.namespace.history_start_turn,
            max_depth: self.namespace.max_depth,
        }
    }
}

fn write_default_if_missing(path: &Path) -> std::io::Result<()> {
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, DEFAULT_CONFIG)
}
