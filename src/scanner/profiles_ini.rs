//! Parser for Firefox's `profiles.ini` registry.
//!
//! Grammar, one construct per line after trimming whitespace:
//!
//! ```text
//! blank      :=                      (ignored)
//! comment    := (';' | '#') any*     (ignored)
//! section    := '[' name ']'
//! entry      := key '=' value        (split at the first '=')
//! ```
//!
//! Entries before the first section and lines matching none of the above
//! are dropped. Within a section the last occurrence of a key wins.
//!
//! A section with a `Path=` entry is a profile. A profile is the default if
//! its own section says `Default=1`, or if an `[Install…]` section's
//! `Default=` names its path (the layout written by Firefox 67+).

use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IniSection {
    pub name: String,
    pub entries: Vec<(String, String)>,
}

impl IniSection {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Splits INI text into sections.
pub fn parse_sections(content: &str) -> Vec<IniSection> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut sections: Vec<IniSection> = Vec::new();

    for line in content.lines().map(str::trim) {
        if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
            continue;
        }

        if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            sections.push(IniSection {
                name: name.trim().to_string(),
                entries: Vec::new(),
            });
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        if let Some(section) = sections.last_mut() {
            section
                .entries
                .push((key.trim().to_string(), value.trim().to_string()));
        }
    }

    sections
}

/// A profile entry from the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredProfile {
    pub section: String,
    pub name: Option<String>,
    pub path: String,
    pub is_relative: Option<bool>,
    pub is_default: bool,
}

impl RegisteredProfile {
    /// Resolves the profile directory against the registry's root.
    ///
    /// `IsRelative=1` joins to `root`, `IsRelative=0` takes the path as is.
    /// Without the flag, absolute paths are kept and relative ones joined.
    pub fn resolve(&self, root: &Path) -> PathBuf {
        let path = Path::new(&self.path);
        match self.is_relative {
            Some(true) => root.join(path),
            Some(false) => path.to_path_buf(),
            None if path.is_absolute() => path.to_path_buf(),
            None => root.join(path),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileRegistry {
    /// Profiles in registry order.
    pub profiles: Vec<RegisteredProfile>,
}

impl ProfileRegistry {
    pub fn parse(content: &str) -> Self {
        let sections = parse_sections(content);

        let install_defaults: Vec<&str> = sections
            .iter()
            .filter(|s| s.name.starts_with("Install"))
            .filter_map(|s| s.get("Default"))
            .collect();

        let profiles = sections
            .iter()
            .filter_map(|section| {
                let path = section.get("Path").filter(|p| !p.is_empty())?;
                let is_default =
                    section.get("Default") == Some("1") || install_defaults.contains(&path);
                Some(RegisteredProfile {
                    section: section.name.clone(),
                    name: section.get("Name").map(str::to_string),
                    path: path.to_string(),
                    is_relative: section.get("IsRelative").map(|v| v == "1"),
                    is_default,
                })
            })
            .collect();

        Self { profiles }
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// The first profile marked as default, if any.
    pub fn default_profile(&self) -> Option<&RegisteredProfile> {
        self.profiles.iter().find(|p| p.is_default)
    }

    /// Every profile to scan: default-marked profiles first, then the rest in
    /// registry order. A path listed twice is returned once.
    pub fn scan_order(&self) -> Vec<&RegisteredProfile> {
        let (defaults, others): (Vec<_>, Vec<_>) =
            self.profiles.iter().partition(|p| p.is_default);

        let mut ordered: Vec<&RegisteredProfile> = Vec::with_capacity(self.profiles.len());
        for profile in defaults.into_iter().chain(others) {
            if !ordered.iter().any(|p| p.path == profile.path) {
                ordered.push(profile);
            }
        }
        ordered
    }
}
