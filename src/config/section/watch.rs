//! `[watch]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [watch]
//! root = "mods"       # Mods directory, relative to this file
//! debounce_ms = 0     # Coalesce same-path notifications (0 = off)
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Filesystem watch settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Mods directory. Created at startup if missing.
    pub root: PathBuf,

    /// Debounce window in milliseconds.
    /// - `0` (default): one event per notification
    pub debounce_ms: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("mods"),
            debounce_ms: 0,
        }
    }
}

impl WatchConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}
