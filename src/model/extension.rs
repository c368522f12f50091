use super::Browser;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extension {
    pub name: String,
    pub version: String,
    pub id: String,
    pub enabled: bool,
    pub browser: Browser,
    /// Profile directory name. Empty when the layout has no notion of profiles.
    #[serde(default)]
    pub profile: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_name: Option<String>,
}

impl Extension {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
        browser: Browser,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            id: id.into(),
            enabled: true,
            browser,
            profile: String::new(),
            profile_name: None,
        }
    }

    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = profile.into();
        self
    }

    pub fn with_profile_name(mut self, name: Option<String>) -> Self {
        self.profile_name = name;
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Identity used for caching: the same ID may appear under several
    /// profiles or versions.
    pub fn key(&self) -> (&str, &str, &str) {
        (&self.id, &self.profile, &self.version)
    }
}

/// Collapses records sharing a [`Extension::key`], keeping the last one at
/// its own position. Matches what the cache stores for the same input.
pub fn dedup_by_key(extensions: Vec<Extension>) -> Vec<Extension> {
    let mut seen = HashSet::new();
    let mut kept: Vec<Extension> = extensions
        .into_iter()
        .rev()
        .filter(|ext| {
            seen.insert((ext.id.clone(), ext.profile.clone(), ext.version.clone()))
        })
        .collect();
    kept.reverse();
    kept
}

/// Discovery result as handed to renderers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Inventory {
    pub extensions: Vec<Extension>,
    pub total: usize,
}

impl Inventory {
    pub fn new(extensions: Vec<Extension>) -> Self {
        let total = extensions.len();
        Self { extensions, total }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inventory_json_shape() {
        let ext = Extension::new("id1", "Dark Reader", "4.9.0", Browser::Firefox)
            .with_profile("abcd.default-release")
            .with_enabled(false);
        let json = serde_json::to_value(Inventory::new(vec![ext])).unwrap();

        assert_eq!(json["total"], 1);
        let first = &json["extensions"][0];
        assert_eq!(first["name"], "Dark Reader");
        assert_eq!(first["browser"], "Firefox");
        assert_eq!(first["enabled"], false);
        assert_eq!(first["profile"], "abcd.default-release");
        assert!(first.get("profile_name").is_none());
    }

    #[test]
    fn test_key_distinguishes_profiles() {
        let a = Extension::new("x", "X", "1.0", Browser::Chrome).with_profile("Default");
        let b = a.clone().with_profile("Profile 1");
        assert_ne!(a.key(), b.key());
    }

    #[test]
    fn test_dedup_keeps_last_occurrence() {
        let first = Extension::new("x", "Old Name", "1.0", Browser::Chrome).with_profile("Default");
        let other = Extension::new("y", "Y", "1.0", Browser::Chrome).with_profile("Default");
        let last = Extension::new("x", "New Name", "1.0", Browser::Chrome).with_profile("Default");
        let elsewhere = last.clone().with_profile("Profile 1");

        let deduped = dedup_by_key(vec![first, other.clone(), last.clone(), elsewhere.clone()]);

        assert_eq!(deduped, vec![other, last, elsewhere]);
    }
}
