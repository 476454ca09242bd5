//! Dashboard configuration
//!
//! Values come from built-in defaults, then an optional `config.toml`, then
//! whatever the command line overrides through the `with_*` builders.

use crate::analytics::Window;
use crate::{HealthdashError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Storage key the tracking snapshot is kept under
pub const DEFAULT_STORAGE_KEY: &str = "therapist-tracking-data";

/// Address the session transport listens on in TUI mode
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:7878";

/// Configuration for Healthdash
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Directory holding the snapshot slots and the log file
    pub data_dir: PathBuf,

    /// Key of the durable tracking snapshot
    pub storage_key: String,

    /// Chart window shown at startup
    pub default_window: Window,

    /// Address the line transport binds to
    pub listen_addr: String,

    /// Maximum number of entries kept in the live feed
    pub feed_capacity: usize,

    /// How long new feed entries and announcements stay highlighted
    pub highlight_secs: u64,

    /// Messages buffered while no session is connected
    pub pending_limit: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            default_window: Window::default(),
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
            feed_capacity: crate::feed::DEFAULT_FEED_CAPACITY,
            highlight_secs: 3,
            pending_limit: 64,
        }
    }
}

impl DashboardConfig {
    /// Default config file location: `<config_dir>/healthdash/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("healthdash").join("config.toml"))
    }

    /// Load configuration from a TOML file. A missing file yields defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
            .map_err(|e| HealthdashError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| HealthdashError::Config(e.to_string()))
    }

    pub fn with_data_dir(mut self, dir: PathBuf) -> Self {
        self.data_dir = dir;
        self
    }

    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    pub fn with_window(mut self, window: Window) -> Self {
        self.default_window = window;
        self
    }

    pub fn with_listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.listen_addr = addr.into();
        self
    }

    pub fn with_feed_capacity(mut self, capacity: usize) -> Self {
        self.feed_capacity = capacity;
        self
    }

    pub fn with_highlight_secs(mut self, secs: u64) -> Self {
        self.highlight_secs = secs;
        self
    }

    pub fn highlight(&self) -> Duration {
        Duration::from_secs(self.highlight_secs)
    }

    /// Log file used while the terminal UI owns the screen
    pub fn log_file(&self) -> PathBuf {
        self.data_dir.join("healthdash.log")
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("healthdash")
}
