//! Core data types for discovered extensions.
//!
//! - [`Extension`] - A single installed extension in one profile
//! - [`Browser`] - The browser family an extension belongs to
//! - [`Platform`] - Host operating system
//! - [`ProfileDescriptor`] - A profile found on disk during a scan
//! - [`Inventory`] - The rendered discovery result
//!
//! # Example
//!
//! ```
//! use browser_inventory::{Browser, Extension, Inventory};
//!
//! let ext = Extension::new("abcdef", "uBlock Origin", "1.58.0", Browser::Chrome)
//!     .with_profile("Default");
//! let inventory = Inventory::new(vec![ext]);
//!
//! assert_eq!(inventory.total, 1);
//! ```

mod extension;

pub use extension::*;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Browser {
    #[serde(alias = "chrome")]
    Chrome,
    #[serde(alias = "edge")]
    Edge,
    #[serde(alias = "firefox")]
    Firefox,
}

impl Browser {
    pub const ALL: [Browser; 3] = [Browser::Chrome, Browser::Edge, Browser::Firefox];

    pub fn as_str(&self) -> &'static str {
        match self {
            Browser::Chrome => "chrome",
            Browser::Edge => "edge",
            Browser::Firefox => "firefox",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Browser::Chrome => "Chrome",
            Browser::Edge => "Edge",
            Browser::Firefox => "Firefox",
        }
    }

    /// Parses a comma-separated, case-insensitive browser selection.
    ///
    /// `None` or an empty string selects every supported browser. Duplicates
    /// are collapsed, keeping first-mention order.
    ///
    /// ```
    /// use browser_inventory::Browser;
    ///
    /// let picked = Browser::parse_selection(Some("FIREFOX,chrome")).unwrap();
    /// assert_eq!(picked, vec![Browser::Firefox, Browser::Chrome]);
    /// assert!(Browser::parse_selection(Some("safari")).is_err());
    /// ```
    pub fn parse_selection(selection: Option<&str>) -> crate::Result<Vec<Browser>> {
        let raw = match selection.map(str::trim) {
            Some(s) if !s.is_empty() => s,
            _ => return Ok(Browser::ALL.to_vec()),
        };

        let mut browsers = Vec::new();
        for name in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let browser = name.parse::<Browser>()?;
            if !browsers.contains(&browser) {
                browsers.push(browser);
            }
        }
        Ok(browsers)
    }
}

impl FromStr for Browser {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "chrome" => Ok(Browser::Chrome),
            "edge" => Ok(Browser::Edge),
            "firefox" => Ok(Browser::Firefox),
            _ => Err(crate::Error::UnknownBrowser(s.to_string())),
        }
    }
}

impl std::fmt::Display for Browser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Linux,
    MacOS,
    Windows,
}

impl Platform {
    /// Returns the host platform, or `None` on an operating system no browser
    /// layout is known for.
    pub fn current() -> Option<Self> {
        if cfg!(target_os = "linux") {
            Some(Platform::Linux)
        } else if cfg!(target_os = "macos") {
            Some(Platform::MacOS)
        } else if cfg!(target_os = "windows") {
            Some(Platform::Windows)
        } else {
            None
        }
    }
}

/// A profile discovered on disk. Built fresh for every scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileDescriptor {
    /// Directory name, used as the profile tag on every record.
    pub dir_name: String,
    /// Human-readable name from the browser's own profile registry.
    pub display_name: Option<String>,
    pub path: PathBuf,
}

impl ProfileDescriptor {
    pub fn new(dir_name: impl Into<String>, path: PathBuf) -> Self {
        Self {
            dir_name: dir_name.into(),
            display_name: None,
            path,
        }
    }

    pub fn with_display_name(mut self, name: Option<String>) -> Self {
        self.display_name = name.filter(|n| !n.is_empty());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_browser_from_str_is_case_insensitive() {
        assert_eq!("Chrome".parse::<Browser>().unwrap(), Browser::Chrome);
        assert_eq!("EDGE".parse::<Browser>().unwrap(), Browser::Edge);
        assert_eq!("firefox".parse::<Browser>().unwrap(), Browser::Firefox);
    }

    #[test]
    fn test_parse_selection_defaults_to_all() {
        assert_eq!(Browser::parse_selection(None).unwrap(), Browser::ALL.to_vec());
        assert_eq!(
            Browser::parse_selection(Some("  ")).unwrap(),
            Browser::ALL.to_vec()
        );
    }

    #[test]
    fn test_parse_selection_dedupes() {
        let picked = Browser::parse_selection(Some("edge, Edge ,chrome")).unwrap();
        assert_eq!(picked, vec![Browser::Edge, Browser::Chrome]);
    }

    #[test]
    fn test_parse_selection_rejects_unknown() {
        let err = Browser::parse_selection(Some("chrome,opera")).unwrap_err();
        assert!(matches!(err, crate::Error::UnknownBrowser(name) if name == "opera"));
    }

    #[test]
    fn test_profile_descriptor_drops_empty_display_name() {
        let profile = ProfileDescriptor::new("Default", PathBuf::from("/p/Default"))
            .with_display_name(Some(String::new()));
        assert_eq!(profile.display_name, None);
    }
}
