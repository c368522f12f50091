//! Browser extension scanners.
//!
//! This module provides the [`Scanner`] trait and the two on-disk layouts it
//! is implemented for:
//!
//! | Scanner | Browsers | Profile discovery |
//! |---------|----------|-------------------|
//! | [`ChromiumScanner`] | Chrome, Edge | `Default` / `Profile *` directories, names from `Local State` |
//! | [`FirefoxScanner`] | Firefox | `profiles.ini`, falling back to `*.default-release` / `*.default` |
//!
//! Scanners are synchronous and read-only. A scanner returns `Err` only for
//! conditions that take out the whole browser; a broken manifest or a
//! profile without extensions is skipped.
//!
//! # Example
//!
//! ```no_run
//! use browser_inventory::model::{Browser, Platform};
//! use browser_inventory::platform::{browser_config, home_dir, resolve_profile_root};
//! use browser_inventory::scanner::scanner_for;
//!
//! let config = browser_config(Browser::Chrome);
//! let root = resolve_profile_root(config, Platform::current(), &home_dir()?)?;
//! for ext in scanner_for(config).scan(&root)? {
//!     println!("{} {} ({})", ext.name, ext.version, ext.profile);
//! }
//! # Ok::<(), browser_inventory::Error>(())
//! ```

mod chromium;
mod firefox;
pub mod profiles_ini;

pub use chromium::ChromiumScanner;
pub use firefox::FirefoxScanner;

use crate::error::Result;
use crate::model::{Browser, Extension};
use crate::platform::{BrowserConfig, Layout};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Discovers the extensions of one browser across all of its profiles.
pub trait Scanner {
    /// The browser this scanner tags its records with.
    fn browser(&self) -> Browser;

    /// Scans every profile under `profile_root`.
    ///
    /// # Errors
    ///
    /// Returns an error if the browser as a whole cannot be scanned (missing
    /// root, unreadable profile registry). Per-extension problems are
    /// skipped, not returned.
    fn scan(&self, profile_root: &Path) -> Result<Vec<Extension>>;
}

/// Returns the scanner matching a browser's layout.
pub fn scanner_for(config: &'static BrowserConfig) -> Box<dyn Scanner> {
    match config.layout {
        Layout::Chromium => Box::new(ChromiumScanner::new(config)),
        Layout::Firefox => Box::new(FirefoxScanner::new(config)),
    }
}

/// Lists the immediate subdirectories of `dir` as `(name, path)` pairs,
/// sorted by name. An unreadable or missing `dir` yields an empty list.
pub(crate) fn subdirectories(dir: &Path) -> Vec<(String, PathBuf)> {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_dir())
        .map(|entry| {
            let name = entry.file_name().to_string_lossy().to_string();
            (name, entry.into_path())
        })
        .collect()
}
