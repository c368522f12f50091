//! Cross-platform path resolution.
//!
//! Every supported browser is described by a static [`BrowserConfig`]
//! holding the path segments of its profile root on each platform. The
//! segments are relative to the user's home directory:
//!
//! | Browser | Linux | macOS | Windows |
//! |---------|-------|-------|---------|
//! | Chrome | `.config/google-chrome/Default` | `Library/Application Support/Google/Chrome/Default` | `AppData/Local/Google/Chrome/User Data/Default` |
//! | Edge | `.config/microsoft-edge/Default` | `Library/Application Support/Microsoft Edge/Default` | `AppData/Local/Microsoft/Edge/User Data/Default` |
//! | Firefox | `.mozilla/firefox` | `Library/Application Support/Firefox/Profiles` | `AppData/Roaming/Mozilla/Firefox` |
//!
//! Resolution is pure path arithmetic; nothing here touches the filesystem
//! apart from [`home_dir`] asking the OS where home is.

use crate::error::{Error, Result};
use crate::model::{Browser, Platform};
use std::path::{Path, PathBuf};

/// On-disk layout family of a browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    Chromium,
    Firefox,
}

/// Static description of where a browser keeps its profiles.
#[derive(Debug)]
pub struct BrowserConfig {
    pub browser: Browser,
    pub windows_path: &'static [&'static str],
    pub macos_path: &'static [&'static str],
    pub linux_path: &'static [&'static str],
    pub manifest_file: &'static str,
    pub layout: Layout,
}

impl BrowserConfig {
    /// Path segments for the given platform.
    pub fn segments(&self, platform: Platform) -> &'static [&'static str] {
        match platform {
            Platform::Windows => self.windows_path,
            Platform::MacOS => self.macos_path,
            Platform::Linux => self.linux_path,
        }
    }
}

pub static BROWSERS: [BrowserConfig; 3] = [
    BrowserConfig {
        browser: Browser::Chrome,
        windows_path: &["AppData", "Local", "Google", "Chrome", "User Data", "Default"],
        macos_path: &["Library", "Application Support", "Google", "Chrome", "Default"],
        linux_path: &[".config", "google-chrome", "Default"],
        manifest_file: "manifest.json",
        layout: Layout::Chromium,
    },
    BrowserConfig {
        browser: Browser::Edge,
        windows_path: &["AppData", "Local", "Microsoft", "Edge", "User Data", "Default"],
        macos_path: &["Library", "Application Support", "Microsoft Edge", "Default"],
        linux_path: &[".config", "microsoft-edge", "Default"],
        manifest_file: "manifest.json",
        layout: Layout::Chromium,
    },
    BrowserConfig {
        browser: Browser::Firefox,
        windows_path: &["AppData", "Roaming", "Mozilla", "Firefox"],
        macos_path: &["Library", "Application Support", "Firefox", "Profiles"],
        linux_path: &[".mozilla", "firefox"],
        manifest_file: "manifest.json",
        layout: Layout::Firefox,
    },
];

/// Looks up the static config for a browser.
pub fn browser_config(browser: Browser) -> &'static BrowserConfig {
    match browser {
        Browser::Chrome => &BROWSERS[0],
        Browser::Edge => &BROWSERS[1],
        Browser::Firefox => &BROWSERS[2],
    }
}

/// Joins `home` with the platform's path segments for `config`.
///
/// `platform` is `None` on an operating system without a known layout,
/// which yields [`Error::UnsupportedPlatform`]. Callers skip the browser and
/// carry on.
///
/// ```
/// use browser_inventory::model::{Browser, Platform};
/// use browser_inventory::platform::{browser_config, resolve_profile_root};
/// use std::path::Path;
///
/// let root = resolve_profile_root(
///     browser_config(Browser::Firefox),
///     Some(Platform::Linux),
///     Path::new("/home/ada"),
/// )
/// .unwrap();
/// assert_eq!(root, Path::new("/home/ada/.mozilla/firefox"));
/// ```
pub fn resolve_profile_root(
    config: &BrowserConfig,
    platform: Option<Platform>,
    home: &Path,
) -> Result<PathBuf> {
    let platform = platform.ok_or(Error::UnsupportedPlatform {
        browser: config.browser,
    })?;

    Ok(config
        .segments(platform)
        .iter()
        .fold(home.to_path_buf(), |path, segment| path.join(segment)))
}

/// Returns the user's home directory.
///
/// # Errors
///
/// Returns [`Error::HomeDirUnavailable`] if the OS cannot tell us.
pub fn home_dir() -> Result<PathBuf> {
    dirs::home_dir().ok_or(Error::HomeDirUnavailable)
}

/// Returns the cache directory for browser-inventory.
///
/// Platform-specific locations:
/// - Linux: `~/.cache/browser-inventory/`
/// - macOS: `~/Library/Caches/browser-inventory/`
/// - Windows: `%LOCALAPPDATA%\browser-inventory\`
///
/// Falls back to the system temp directory if no cache directory can be
/// determined.
pub fn cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("browser-inventory")
}
