//! Discovery across browsers.
//!
//! [`DiscoveryCoordinator`] runs one pass per selected browser, in order:
//!
//! 1. ask the [`ResultCache`] for a fresh snapshot (skipped when forcing a refresh)
//! 2. on a miss, resolve the profile root and run the browser's scanner
//! 3. write the fresh result back to the cache
//!
//! A browser that fails (unsupported platform, missing profile root,
//! unreadable registry) is reported as a warning and contributes nothing;
//! the remaining browsers are still discovered. A cache that fails to read
//! or write is bypassed with a warning. Only fatal errors abort the run.

use crate::cache::{CacheLookup, ResultCache};
use crate::error::Result;
use crate::model::{dedup_by_key, Browser, Extension, Platform};
use crate::platform::{browser_config, resolve_profile_root};
use crate::scanner::scanner_for;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Where a browser's records came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Cache,
    Scan,
}

/// Per-browser outcome of a discovery pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowserOutcome {
    Found {
        browser: Browser,
        origin: Origin,
        count: usize,
    },
    Failed {
        browser: Browser,
        reason: String,
    },
}

#[derive(Debug, Default)]
pub struct Discovery {
    pub extensions: Vec<Extension>,
    pub outcomes: Vec<BrowserOutcome>,
}

impl Discovery {
    /// Warnings for browsers that contributed nothing because they failed.
    pub fn warnings(&self) -> impl Iterator<Item = (Browser, &str)> {
        self.outcomes.iter().filter_map(|outcome| match outcome {
            BrowserOutcome::Failed { browser, reason } => Some((*browser, reason.as_str())),
            BrowserOutcome::Found { .. } => None,
        })
    }
}

pub struct DiscoveryCoordinator<'a> {
    home: PathBuf,
    platform: Option<Platform>,
    cache: Option<&'a mut ResultCache>,
    force_refresh: bool,
}

impl<'a> DiscoveryCoordinator<'a> {
    /// Creates a coordinator resolving browser paths under `home` for
    /// `platform`. Pass [`Platform::current()`] outside of tests.
    pub fn new(home: impl Into<PathBuf>, platform: Option<Platform>) -> Self {
        Self {
            home: home.into(),
            platform,
            cache: None,
            force_refresh: false,
        }
    }

    pub fn with_cache(mut self, cache: &'a mut ResultCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Ignores cached snapshots regardless of age. Fresh results are still
    /// written back.
    pub fn force_refresh(mut self, force: bool) -> Self {
        self.force_refresh = force;
        self
    }

    /// Discovers extensions for `browsers`, in the order given.
    ///
    /// # Errors
    ///
    /// Returns an error only when a scanner hits a fatal condition.
    /// Per-browser failures land in [`Discovery::outcomes`]; a cache that
    /// fails to read or write is logged and bypassed.
    pub fn discover(&mut self, browsers: &[Browser]) -> Result<Discovery> {
        let mut discovery = Discovery::default();

        for &browser in browsers {
            if let Some(cached) = self.cached(browser) {
                debug!(%browser, count = cached.len(), "serving from cache");
                discovery.outcomes.push(BrowserOutcome::Found {
                    browser,
                    origin: Origin::Cache,
                    count: cached.len(),
                });
                discovery.extensions.extend(cached);
                continue;
            }

            match self.scan(browser) {
                Ok(extensions) => {
                    let extensions = dedup_by_key(extensions);
                    self.store(browser, &extensions);
                    info!(%browser, count = extensions.len(), "scanned");
                    discovery.outcomes.push(BrowserOutcome::Found {
                        browser,
                        origin: Origin::Scan,
                        count: extensions.len(),
                    });
                    discovery.extensions.extend(extensions);
                }
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    debug!(%browser, error = %e, "skipping browser");
                    discovery.outcomes.push(BrowserOutcome::Failed {
                        browser,
                        reason: e.to_string(),
                    });
                }
            }
        }

        Ok(discovery)
    }

    /// Fresh cached records, or `None` when a rescan is needed.
    fn cached(&self, browser: Browser) -> Option<Vec<Extension>> {
        if self.force_refresh {
            return None;
        }
        let cache = self.cache.as_deref()?;

        match cache.read(browser) {
            Ok(CacheLookup::Fresh(snapshot)) => Some(snapshot.extensions),
            Ok(CacheLookup::Stale(_) | CacheLookup::Missing) => None,
            Err(e) => {
                warn!(%browser, error = %e, "cache read failed, rescanning");
                None
            }
        }
    }

    fn store(&mut self, browser: Browser, extensions: &[Extension]) {
        let Some(cache) = self.cache.as_deref_mut() else {
            return;
        };
        if let Err(e) = cache.write(browser, extensions) {
            warn!(%browser, error = %e, "cache write failed, results not cached");
        }
    }

    fn scan(&self, browser: Browser) -> Result<Vec<Extension>> {
        let config = browser_config(browser);
        let root = resolve_profile_root(config, self.platform, &self.home)?;
        debug!(%browser, root = %root.display(), "scanning");
        scanner_for(config).scan(&root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, Utc};
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn chrome_extension(home: &Path, profile: &str, id: &str, name: &str) {
        let dir = home
            .join(".config/google-chrome")
            .join(profile)
            .join("Extensions")
            .join(id)
            .join("1.0_0");
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join("manifest.json"),
            format!(r#"{{"name": "{name}", "version": "1.0"}}"#),
        )
        .unwrap();
    }

    fn firefox_extension(home: &Path, id: &str) {
        let root = home.join(".mozilla/firefox");
        fs::create_dir_all(root.join("p.default-release")).unwrap();
        fs::write(root.join("profiles.ini"), "[Profile0]\nPath=p.default-release\nDefault=1\n").unwrap();
        fs::write(
            root.join("p.default-release/extensions.json"),
            format!(r#"{{"addons": [{{"id": "{id}", "version": "2", "active": true, "defaultLocale": {{"name": "FF"}}}}]}}"#),
        )
        .unwrap();
    }

    #[test]
    fn test_two_chrome_profiles() {
        let home = TempDir::new().unwrap();
        chrome_extension(home.path(), "Default", "aaa", "Alpha");
        chrome_extension(home.path(), "Profile 1", "bbb", "Beta");

        let discovery = DiscoveryCoordinator::new(home.path(), Some(Platform::Linux))
            .discover(&[Browser::Chrome])
            .unwrap();

        assert_eq!(discovery.extensions.len(), 2);
        let profiles: Vec<_> = discovery.extensions.iter().map(|e| e.profile.as_str()).collect();
        assert_eq!(profiles, vec!["Default", "Profile 1"]);
    }

    #[test]
    fn test_failure_is_isolated_per_browser() {
        let home = TempDir::new().unwrap();
        firefox_extension(home.path(), "ff@x");

        let discovery = DiscoveryCoordinator::new(home.path(), Some(Platform::Linux))
            .discover(&Browser::ALL)
            .unwrap();

        assert_eq!(discovery.extensions.len(), 1);
        assert_eq!(discovery.extensions[0].browser, Browser::Firefox);

        let failed: Vec<_> = discovery.warnings().map(|(b, _)| b).collect();
        assert_eq!(failed, vec![Browser::Chrome, Browser::Edge]);
    }

    #[test]
    fn test_unsupported_platform_is_a_warning() {
        let home = TempDir::new().unwrap();
        let discovery = DiscoveryCoordinator::new(home.path(), None)
            .discover(&[Browser::Edge])
            .unwrap();

        assert!(discovery.extensions.is_empty());
        let (browser, reason) = discovery.warnings().next().unwrap();
        assert_eq!(browser, Browser::Edge);
        assert!(reason.contains("unsupported platform"));
    }

    #[test]
    fn test_fresh_cache_skips_scan() {
        let home = TempDir::new().unwrap();
        let mut cache = ResultCache::in_memory().unwrap();
        let cached = vec![Extension::new("cached", "From Cache", "1", Browser::Chrome)];
        cache.write(Browser::Chrome, &cached).unwrap();
        chrome_extension(home.path(), "Default", "live", "Live");

        let discovery = DiscoveryCoordinator::new(home.path(), Some(Platform::Linux))
            .with_cache(&mut cache)
            .discover(&[Browser::Chrome])
            .unwrap();

        assert_eq!(discovery.extensions, cached);
        assert_eq!(
            discovery.outcomes,
            vec![BrowserOutcome::Found {
                browser: Browser::Chrome,
                origin: Origin::Cache,
                count: 1
            }]
        );
    }

    #[test]
    fn test_force_refresh_bypasses_fresh_cache() {
        let home = TempDir::new().unwrap();
        let mut cache = ResultCache::in_memory().unwrap();
        cache
            .write(Browser::Chrome, &[Extension::new("cached", "Old", "1", Browser::Chrome)])
            .unwrap();
        chrome_extension(home.path(), "Default", "live", "Live");

        let discovery = DiscoveryCoordinator::new(home.path(), Some(Platform::Linux))
            .with_cache(&mut cache)
            .force_refresh(true)
            .discover(&[Browser::Chrome])
            .unwrap();

        assert_eq!(discovery.extensions.len(), 1);
        assert_eq!(discovery.extensions[0].id, "live");

        // The rescan replaced the snapshot.
        let stored = cache.read(Browser::Chrome).unwrap().into_fresh().unwrap();
        assert_eq!(stored[0].id, "live");
    }

    #[test]
    fn test_stale_cache_triggers_rescan() {
        let home = TempDir::new().unwrap();
        let mut cache = ResultCache::in_memory().unwrap();
        cache
            .write_at(
                Browser::Chrome,
                &[Extension::new("cached", "Old", "1", Browser::Chrome)],
                Utc::now() - TimeDelta::hours(2),
            )
            .unwrap();
        chrome_extension(home.path(), "Default", "live", "Live");

        let discovery = DiscoveryCoordinator::new(home.path(), Some(Platform::Linux))
            .with_cache(&mut cache)
            .discover(&[Browser::Chrome])
            .unwrap();

        assert_eq!(discovery.extensions[0].id, "live");
    }

    #[test]
    fn test_failed_browser_is_not_cached() {
        let home = TempDir::new().unwrap();
        let mut cache = ResultCache::in_memory().unwrap();

        DiscoveryCoordinator::new(home.path(), Some(Platform::Linux))
            .with_cache(&mut cache)
            .discover(&[Browser::Edge])
            .unwrap();

        assert_eq!(cache.read(Browser::Edge).unwrap(), CacheLookup::Missing);
    }

    fn broken_cache(dir: &Path, drop_table: &str) -> ResultCache {
        let path = dir.join("inventory.db");
        let cache = ResultCache::open(&path).unwrap();
        rusqlite::Connection::open(&path)
            .unwrap()
            .execute_batch(&format!("DROP TABLE {drop_table};"))
            .unwrap();
        cache
    }

    #[test]
    fn test_cache_write_failure_keeps_all_browsers() {
        let home = TempDir::new().unwrap();
        let state = TempDir::new().unwrap();
        chrome_extension(home.path(), "Default", "aaa", "Alpha");
        firefox_extension(home.path(), "ff@x");
        let mut cache = broken_cache(state.path(), "chrome_extensions");

        let discovery = DiscoveryCoordinator::new(home.path(), Some(Platform::Linux))
            .with_cache(&mut cache)
            .discover(&[Browser::Chrome, Browser::Firefox])
            .unwrap();

        let ids: Vec<_> = discovery.extensions.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["aaa", "ff@x"]);
        assert_eq!(discovery.warnings().count(), 0);

        // Firefox's table is intact, so its snapshot was still stored.
        let stored = cache.read(Browser::Firefox).unwrap().into_fresh().unwrap();
        assert_eq!(stored[0].id, "ff@x");
    }

    #[test]
    fn test_cache_read_failure_rescans() {
        let home = TempDir::new().unwrap();
        let state = TempDir::new().unwrap();
        chrome_extension(home.path(), "Default", "aaa", "Alpha");
        firefox_extension(home.path(), "ff@x");
        let mut cache = broken_cache(state.path(), "snapshots");

        let discovery = DiscoveryCoordinator::new(home.path(), Some(Platform::Linux))
            .with_cache(&mut cache)
            .discover(&[Browser::Chrome, Browser::Firefox])
            .unwrap();

        assert_eq!(discovery.extensions.len(), 2);
        assert!(discovery
            .outcomes
            .iter()
            .all(|o| matches!(o, BrowserOutcome::Found { origin: Origin::Scan, .. })));
    }

    #[test]
    fn test_duplicate_keys_match_cached_run() {
        let home = TempDir::new().unwrap();
        let ext_dir = home.path().join(".config/google-chrome/Default/Extensions/dup");
        for (version_dir, name) in [("1.0_0", "First"), ("1.0_1", "Second")] {
            let dir = ext_dir.join(version_dir);
            fs::create_dir_all(&dir).unwrap();
            fs::write(
                dir.join("manifest.json"),
                format!(r#"{{"name": "{name}", "version": "1.0"}}"#),
            )
            .unwrap();
        }
        let mut cache = ResultCache::in_memory().unwrap();

        let live = DiscoveryCoordinator::new(home.path(), Some(Platform::Linux))
            .with_cache(&mut cache)
            .discover(&[Browser::Chrome])
            .unwrap();
        let cached = DiscoveryCoordinator::new(home.path(), Some(Platform::Linux))
            .with_cache(&mut cache)
            .discover(&[Browser::Chrome])
            .unwrap();

        assert_eq!(live.extensions.len(), 1);
        assert_eq!(live.extensions[0].name, "Second");
        assert_eq!(
            cached.outcomes,
            vec![BrowserOutcome::Found {
                browser: Browser::Chrome,
                origin: Origin::Cache,
                count: 1
            }]
        );
        assert_eq!(cached.extensions, live.extensions);
    }
}
