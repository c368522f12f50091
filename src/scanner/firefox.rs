use super::profiles_ini::ProfileRegistry;
use super::{subdirectories, Scanner};
use crate::error::{Error, Result};
use crate::model::{Browser, Extension, ProfileDescriptor};
use crate::platform::BrowserConfig;
use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const PROFILE_REGISTRY_FILE: &str = "profiles.ini";
const ADDON_REGISTRY_FILE: &str = "extensions.json";

/// Profile root name on macOS, where `profiles.ini` lives one level up.
const NESTED_PROFILES_DIR: &str = "Profiles";

/// Directory-name markers tried, in order, when the registry lists no profile.
const FALLBACK_MARKERS: [&str; 2] = [".default-release", ".default"];

/// Scans Firefox add-ons across every registered profile.
pub struct FirefoxScanner {
    config: &'static BrowserConfig,
}

#[derive(Deserialize)]
struct AddonsJson {
    #[serde(default)]
    addons: Vec<FirefoxAddon>,
}

#[derive(Deserialize)]
struct FirefoxAddon {
    id: Option<String>,
    version: Option<String>,
    #[serde(default)]
    active: bool,
    #[serde(rename = "defaultLocale")]
    default_locale: Option<DefaultLocale>,
}

#[derive(Deserialize)]
struct DefaultLocale {
    name: Option<String>,
}

impl FirefoxScanner {
    pub fn new(config: &'static BrowserConfig) -> Self {
        Self { config }
    }

    fn scan_profile(&self, profile: &ProfileDescriptor) -> Vec<Extension> {
        let path = profile.path.join(ADDON_REGISTRY_FILE);
        let content = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "no addon registry, skipping profile");
                return Vec::new();
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to read addon registry");
                return Vec::new();
            }
        };

        let data: AddonsJson = match serde_json::from_str(&content) {
            Ok(d) => d,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to parse addon registry");
                return Vec::new();
            }
        };

        let extensions: Vec<Extension> = data
            .addons
            .into_iter()
            .filter_map(|addon| parse_addon(addon, self.config.browser))
            .map(|ext| {
                ext.with_profile(&profile.dir_name)
                    .with_profile_name(profile.display_name.clone())
            })
            .collect();

        debug!(profile = %profile.dir_name, count = extensions.len(), "scanned profile");
        extensions
    }
}

impl Scanner for FirefoxScanner {
    fn browser(&self) -> Browser {
        self.config.browser
    }

    fn scan(&self, profile_root: &Path) -> Result<Vec<Extension>> {
        if !profile_root.is_dir() {
            return Err(Error::ProfileRootMissing {
                browser: self.config.browser,
                path: profile_root.to_path_buf(),
            });
        }

        let extensions: Vec<Extension> = discover_profiles(profile_root)?
            .iter()
            .flat_map(|profile| self.scan_profile(profile))
            .collect();

        if extensions.is_empty() {
            debug!(path = %profile_root.display(), "no extensions found across profiles");
        }
        Ok(extensions)
    }
}

/// Resolves the profiles to scan under `root`.
///
/// A missing `profiles.ini` falls back to guessing from directory names; an
/// unreadable one fails the browser.
fn discover_profiles(root: &Path) -> Result<Vec<ProfileDescriptor>> {
    let Some((registry, base)) = load_registry(root)? else {
        return Ok(fallback_profiles(root));
    };
    if registry.is_empty() {
        return Ok(fallback_profiles(root));
    }

    Ok(registry
        .scan_order()
        .into_iter()
        .map(|entry| {
            let path = entry.resolve(&base);
            debug!(path = %path.display(), default = entry.is_default, "registered profile");
            ProfileDescriptor::new(dir_name(&path), path).with_display_name(entry.name.clone())
        })
        .collect())
}

/// Reads `profiles.ini` from `root`, or from its parent when `root` is the
/// macOS `Profiles` directory. Returns the registry together with the
/// directory its relative paths are resolved against.
fn load_registry(root: &Path) -> Result<Option<(ProfileRegistry, PathBuf)>> {
    let mut bases = vec![root.to_path_buf()];
    if root.file_name().is_some_and(|name| name == NESTED_PROFILES_DIR) {
        bases.extend(root.parent().map(Path::to_path_buf));
    }

    for base in bases {
        let ini_path = base.join(PROFILE_REGISTRY_FILE);
        match fs::read_to_string(&ini_path) {
            Ok(content) => return Ok(Some((ProfileRegistry::parse(&content), base))),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %ini_path.display(), "no profile registry");
            }
            Err(e) => return Err(Error::io(ini_path, e)),
        }
    }

    Ok(None)
}

/// Guesses profiles from directory names when the registry has none.
fn fallback_profiles(root: &Path) -> Vec<ProfileDescriptor> {
    let dirs = subdirectories(root);

    for marker in FALLBACK_MARKERS {
        let matches: Vec<ProfileDescriptor> = dirs
            .iter()
            .filter(|(name, _)| name.contains(marker))
            .map(|(name, path)| ProfileDescriptor::new(name.clone(), path.clone()))
            .collect();
        if !matches.is_empty() {
            debug!(marker, count = matches.len(), "using fallback profiles");
            return matches;
        }
    }

    Vec::new()
}

fn dir_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

fn parse_addon(addon: FirefoxAddon, browser: Browser) -> Option<Extension> {
    let id = addon.id.filter(|id| !id.is_empty())?;

    let name = addon
        .default_locale
        .and_then(|locale| locale.name)
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| id.clone());
    let version = addon.version.unwrap_or_default();

    Some(Extension::new(id, name, version, browser).with_enabled(addon.active))
}
