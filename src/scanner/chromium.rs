use super::{subdirectories, Scanner};
use crate::error::{Error, Result};
use crate::locale::{placeholder_key, resolve_message, LocaleDir};
use crate::model::{Browser, Extension, ProfileDescriptor};
use crate::platform::BrowserConfig;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Profile-name registry kept by Chromium at the user-data root.
const LOCAL_STATE_FILE: &str = "Local State";

/// Scans Chrome and Edge, which share the Chromium on-disk layout:
///
/// ```text
/// <user data>/
///   Local State
///   Default/Extensions/<id>/<version>/manifest.json
///   Profile 1/Extensions/<id>/<version>/manifest.json
/// ```
///
/// Every version directory with a readable manifest yields one record, so an
/// extension mid-upgrade shows up once per installed version.
pub struct ChromiumScanner {
    config: &'static BrowserConfig,
}

#[derive(Deserialize)]
struct ChromiumManifest {
    name: Option<String>,
    version: Option<String>,
    default_locale: Option<String>,
}

#[derive(Deserialize, Default)]
struct LocalState {
    #[serde(default)]
    profile: ProfileSection,
}

#[derive(Deserialize, Default)]
struct ProfileSection {
    #[serde(default)]
    info_cache: HashMap<String, ProfileInfo>,
}

#[derive(Deserialize)]
struct ProfileInfo {
    name: Option<String>,
}

impl ChromiumScanner {
    pub fn new(config: &'static BrowserConfig) -> Self {
        Self { config }
    }

    fn scan_profile(&self, profile: &ProfileDescriptor) -> Vec<Extension> {
        let extensions_dir = profile.path.join("Extensions");
        if !extensions_dir.is_dir() {
            debug!(
                profile = %profile.dir_name,
                path = %extensions_dir.display(),
                "no Extensions directory, skipping profile"
            );
            return Vec::new();
        }

        let mut extensions = Vec::new();
        for (extension_id, extension_path) in subdirectories(&extensions_dir) {
            for (version_dir, version_path) in subdirectories(&extension_path) {
                let manifest_path = version_path.join(self.config.manifest_file);
                let Some(manifest) = read_manifest(&manifest_path) else {
                    continue;
                };

                let ext = manifest_to_extension(
                    manifest,
                    &extension_id,
                    &version_dir,
                    &version_path,
                    self.config.browser,
                )
                .with_profile(&profile.dir_name)
                .with_profile_name(profile.display_name.clone());
                extensions.push(ext);
            }
        }

        debug!(
            browser = %self.config.browser,
            profile = %profile.dir_name,
            count = extensions.len(),
            "scanned profile"
        );
        extensions
    }
}

impl Scanner for ChromiumScanner {
    fn browser(&self) -> Browser {
        self.config.browser
    }

    fn scan(&self, profile_root: &Path) -> Result<Vec<Extension>> {
        // The configured root is the default profile; its parent holds every profile.
        let user_data = profile_root.parent().unwrap_or(profile_root);
        if !user_data.is_dir() {
            return Err(Error::ProfileRootMissing {
                browser: self.config.browser,
                path: user_data.to_path_buf(),
            });
        }

        let names = load_profile_names(user_data);
        let extensions: Vec<Extension> = discover_profiles(user_data, &names)
            .iter()
            .flat_map(|profile| self.scan_profile(profile))
            .collect();

        if extensions.is_empty() {
            debug!(path = %user_data.display(), "no extensions found across profiles");
        }
        Ok(extensions)
    }
}

/// Returns true for directory names Chromium uses for user profiles.
fn is_profile_dir(name: &str) -> bool {
    name == "Default" || name.starts_with("Profile")
}

/// Enumerates candidate profiles under the user-data root.
fn discover_profiles(user_data: &Path, names: &HashMap<String, String>) -> Vec<ProfileDescriptor> {
    subdirectories(user_data)
        .into_iter()
        .filter(|(name, _)| is_profile_dir(name))
        .map(|(name, path)| {
            let display_name = names.get(&name).cloned();
            ProfileDescriptor::new(name, path).with_display_name(display_name)
        })
        .collect()
}

/// Maps profile directory names to display names from `Local State`.
///
/// A missing or unparseable file yields an empty map; callers fall back to
/// the directory name.
fn load_profile_names(user_data: &Path) -> HashMap<String, String> {
    let path = user_data.join(LOCAL_STATE_FILE);
    let state = match fs::read_to_string(&path) {
        Ok(content) => match serde_json::from_str::<LocalState>(&content) {
            Ok(state) => state,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "unparseable Local State");
                return HashMap::new();
            }
        },
        Err(e) => {
            debug!(path = %path.display(), error = %e, "no Local State");
            return HashMap::new();
        }
    };

    state
        .profile
        .info_cache
        .into_iter()
        .filter_map(|(dir, info)| Some((dir, info.name?)))
        .collect()
}

fn read_manifest(path: &Path) -> Option<ChromiumManifest> {
    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "skipping unreadable manifest");
            return None;
        }
    };

    match serde_json::from_str(&content) {
        Ok(m) => Some(m),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "skipping unparseable manifest");
            None
        }
    }
}

fn manifest_to_extension(
    manifest: ChromiumManifest,
    extension_id: &str,
    version_dir: &str,
    version_path: &Path,
    browser: Browser,
) -> Extension {
    let name = manifest
        .name
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| extension_id.to_string());

    let name = if placeholder_key(&name).is_some() {
        let source = LocaleDir::for_extension(version_path);
        resolve_message(&name, manifest.default_locale.as_deref(), &source)
    } else {
        name
    };

    let version = manifest
        .version
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| version_dir.to_string());

    // The on-disk layout carries no enabled bit for Chromium extensions.
    Extension::new(extension_id, name, version, browser).with_enabled(true)
}
