//! Configuration file handling.
//!
//! This module provides loading and saving of browser-inventory
//! configuration from a TOML file.
//!
//! # Configuration Location
//!
//! The configuration file is stored at:
//! - Linux: `~/.config/browser-inventory/config.toml`
//! - macOS: `~/Library/Application Support/browser-inventory/config.toml`
//! - Windows: `%APPDATA%\browser-inventory\config.toml`
//!
//! # Example Configuration
//!
//! ```toml
//! cache_max_age_minutes = 30
//! default_browsers = ["Chrome", "Firefox"]
//! default_format = "text"
//! cache_path = "/var/tmp/inventory.db"
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cache::default_cache_path;
use crate::model::Browser;

/// User settings for discovery and rendering.
///
/// ```no_run
/// use browser_inventory::Config;
///
/// let config = Config::load().unwrap_or_default();
///
/// println!("Cache max age: {} minutes", config.cache_max_age_minutes);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// How long a cached scan stays fresh, in minutes.
    ///
    /// Default: 30 minutes
    pub cache_max_age_minutes: u64,

    /// Which browsers to inventory when no `--browser` flag is provided.
    ///
    /// Default: all browsers
    pub default_browsers: Vec<Browser>,

    /// Default output format when no `--format` flag is provided.
    ///
    /// Valid values: "text", "table", "json"
    /// Default: "text"
    pub default_format: String,

    /// Overrides the location of the SQLite cache.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_max_age_minutes: 30,
            default_browsers: Browser::ALL.to_vec(),
            default_format: "text".to_string(),
            cache_path: None,
        }
    }
}

impl Config {
    /// Reads the config file at [`Config::config_path`], or defaults when
    /// there is none.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Reads `path`, falling back to defaults only when the file is absent.
    /// A file that exists but fails to parse is an error.
    pub fn load_from(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(content) => Self::from_toml(&content)
                .with_context(|| format!("invalid config at {}", path.display())),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e).with_context(|| format!("cannot read {}", path.display())),
        }
    }

    /// Parses configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Writes to [`Config::config_path`].
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    /// Writes `self` as TOML to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("cannot create {}", dir.display()))?;
        }
        fs::write(path, toml::to_string_pretty(self)?)
            .with_context(|| format!("cannot write {}", path.display()))
    }

    /// Returns the path to the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("browser-inventory")
            .join("config.toml")
    }

    /// The default configuration as TOML, for `config --init`.
    pub fn generate_default_config() -> String {
        toml::to_string_pretty(&Config::default()).unwrap_or_default()
    }

    /// The freshness threshold for cached scans.
    pub fn cache_max_age(&self) -> Duration {
        Duration::from_secs(self.cache_max_age_minutes * 60)
    }

    /// The SQLite cache location, honoring the override.
    pub fn cache_path(&self) -> PathBuf {
        self.cache_path.clone().unwrap_or_else(default_cache_path)
    }

    /// Browser selection string used when the CLI doesn't pass one.
    pub fn default_selection(&self) -> String {
        self.default_browsers
            .iter()
            .map(Browser::as_str)
            .collect::<Vec<_>>()
            .join(",")
    }
}
