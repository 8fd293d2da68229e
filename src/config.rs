//! Persistent client settings.
//!
//! Server location, request behaviour and list defaults live in a TOML file
//! under the platform config directory. Every field has a default, so a
//! partial file (or none at all) is valid.

use crate::api::DEFAULT_BASE_URL;
use crate::error::{AppError, Result};
use crate::types::{Ordering, Status};
use crate::views::FilterStrategy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Settings read from `config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Root of the MovieMate REST API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Extra attempts for reads that fail with a transient error
    #[serde(default = "default_read_retries")]
    pub read_retries: u32,

    /// Default list ordering, e.g. "-created_at" or "title"
    #[serde(default)]
    pub ordering: Ordering,

    /// Where list filters are applied: "server" or "local"
    #[serde(default)]
    pub filter_strategy: FilterStrategy,

    /// Initial status for titles imported from an external catalog
    #[serde(default)]
    pub import_status: Status,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_read_retries() -> u32 {
    2
}

impl Config {
    /// Settings for a local development server.
    pub fn new() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            read_retries: default_read_retries(),
            ordering: Ordering::default(),
            filter_strategy: FilterStrategy::default(),
            import_status: Status::default(),
        }
    }

    /// `<config dir>/moviemate/config.toml`, e.g. `~/.config/moviemate/config.toml` on Linux.
    pub fn get_config_path() -> std::result::Result<PathBuf, io::Error> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| {
                io::Error::new(io::ErrorKind::NotFound, "Could not find config directory")
            })?
            .join("moviemate");

        Ok(config_dir.join("config.toml"))
    }

    /// Read the user's config file; defaults when there is none.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    /// Read and validate settings from `path`.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make every request fail.
    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(AppError::Config("base_url must not be empty".to_string()));
        }
        if self.timeout_secs == 0 {
            return Err(AppError::Config(
                "timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Write settings to `path`, creating missing directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Write a default file unless one is already present; returns its path.
    pub fn create_default_if_missing() -> Result<PathBuf> {
        let path = Self::get_config_path()?;

        if !path.exists() {
            Self::new().save_to(&path)?;
        }

        Ok(path)
    }
}
