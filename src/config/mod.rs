//! Sync configuration management for `modsync.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── serve      # [serve]
//! │   └── watch      # [watch]
//! ├── types/         # Utility types
//! │   └── error      # ConfigError
//! └── mod.rs         # SyncConfig (this file)
//! ```
//!
//! # Sections
//!
//! | Section   | Purpose                                      |
//! |-----------|----------------------------------------------|
//! | `[watch]` | Mods root directory, debounce window         |
//! | `[serve]` | WebSocket bind interface and port            |
//!
//! The file is optional: without it every field takes its default.
//! CLI flags override file values.

pub mod section;
pub mod types;

pub use section::{ServeConfig, WatchConfig};
pub use types::ConfigError;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::cli::Cli;
use crate::log;
use crate::utils::path::{normalize_path, resolve_path};

/// Root configuration structure representing modsync.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Absolute path to the config file (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Watch settings
    #[serde(default)]
    pub watch: WatchConfig,

    /// WebSocket server settings
    #[serde(default)]
    pub serve: ServeConfig,
}

impl SyncConfig {
    /// Load configuration from CLI arguments.
    ///
    /// Relative `watch.root` values from the file resolve against the
    /// file's directory; `--root` resolves against the current directory.
    /// The root directory is created if missing.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;
        let config_path = cwd.join(&cli.config);

        let mut config = if config_path.is_file() {
            Self::from_path(&config_path)?
        } else {
            crate::debug!("config"; "{} not found, using defaults", config_path.display());
            Self::default()
        };

        let base_dir = config_path.parent().unwrap_or(&cwd).to_path_buf();
        config.config_path = config_path;
        config.apply_cli(cli, &cwd);
        config.validate()?;
        config.prepare_root(&base_dir)?;

        Ok(config)
    }

    /// Read and parse a config file, warning about unknown fields.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)
            .with_context(|| format!("failed to load {}", path.display()))?;

        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring:", display_path);
        for field in fields {
            eprintln!("- {}", field);
        }
    }

    /// Apply CLI overrides on top of file values.
    fn apply_cli(&mut self, cli: &Cli, cwd: &Path) {
        if let Some(root) = &cli.root {
            // Absolute here, so the config-relative resolution keeps it as-is
            self.watch.root = cwd.join(root);
        }
        if let Some(interface) = cli.interface {
            self.serve.interface = interface;
        }
        if let Some(port) = cli.port {
            self.serve.port = port;
        }
        if let Some(debounce) = cli.debounce {
            self.watch.debounce_ms = debounce;
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.serve.port == 0 {
            return Err(ConfigError::Validation(
                "[serve] port must be between 1 and 65535".into(),
            ));
        }
        if self.watch.root.as_os_str().is_empty() {
            return Err(ConfigError::Validation("[watch] root must not be empty".into()));
        }
        Ok(())
    }

    /// Resolve the root to an absolute normalized path, creating it if absent.
    fn prepare_root(&mut self, base_dir: &Path) -> Result<()> {
        let root = resolve_path(&self.watch.root, base_dir);

        if root.is_file() {
            return Err(ConfigError::Validation(format!(
                "[watch] root {} is a file, expected a directory",
                root.display()
            ))
            .into());
        }
        if !root.exists() {
            fs::create_dir_all(&root)
                .with_context(|| format!("failed to create {}", root.display()))?;
            log!("watch"; "created {}", root.display());
        }

        // Canonical form: notify reports paths under it
        self.watch.root = normalize_path(&root);
        Ok(())
    }
}

/// Parse config from TOML content.
/// Panics if there are unknown fields (to catch config typos in tests).
#[cfg(test)]
pub fn test_parse_config(content: &str) -> SyncConfig {
    let (parsed, ignored) = SyncConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

// ============================================================================
// tests
// ============================================================================
