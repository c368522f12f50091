//! SQLite-backed cache of the last discovered extensions per browser.
//!
//! Each browser has its own table keyed by `(id, profile, version)`, plus a
//! row in `snapshots` stamping when that browser was last scanned. A
//! snapshot is replaced as a whole inside one transaction, so a read never
//! mixes rows from two scans. An empty scan is still a snapshot and is
//! served from cache like any other.
//!
//! # Cache Location
//!
//! - Linux: `~/.cache/browser-inventory/inventory.db`
//! - macOS: `~/Library/Caches/browser-inventory/inventory.db`
//! - Windows: `%LOCALAPPDATA%\browser-inventory\inventory.db`
//!
//! # Example
//!
//! ```
//! use browser_inventory::cache::{CacheLookup, ResultCache};
//! use browser_inventory::{Browser, Extension};
//!
//! let mut cache = ResultCache::in_memory()?;
//! let ext = Extension::new("abc", "Example", "1.0", Browser::Edge).with_profile("Default");
//! cache.write(Browser::Edge, &[ext.clone()])?;
//!
//! match cache.read(Browser::Edge)? {
//!     CacheLookup::Fresh(snapshot) => assert_eq!(snapshot.extensions, vec![ext]),
//!     other => panic!("expected a fresh snapshot, got {other:?}"),
//! }
//! # Ok::<(), browser_inventory::Error>(())
//! ```

use crate::error::{Error, Result};
use crate::model::{Browser, Extension};
use crate::platform::cache_dir;
use chrono::{DateTime, TimeZone, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Snapshots older than this are stale.
pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(30 * 60);

const SCHEMA_VERSION: i32 = 1;

/// Returns the default database location.
pub fn default_cache_path() -> PathBuf {
    cache_dir().join("inventory.db")
}

/// A stored discovery result for one browser.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub browser: Browser,
    pub extensions: Vec<Extension>,
    pub scanned_at: DateTime<Utc>,
    pub age: Duration,
}

/// Outcome of a cache read.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheLookup {
    /// Within the freshness threshold; use as is.
    Fresh(Snapshot),
    /// Present but too old; the caller must rescan.
    Stale(Snapshot),
    /// Never scanned (or cleared); the caller must rescan.
    Missing,
}

impl CacheLookup {
    /// Returns the extensions only if the snapshot is fresh.
    pub fn into_fresh(self) -> Option<Vec<Extension>> {
        match self {
            CacheLookup::Fresh(snapshot) => Some(snapshot.extensions),
            _ => None,
        }
    }
}

pub struct ResultCache {
    conn: Connection,
    max_age: Duration,
}

impl ResultCache {
    /// Opens or creates the cache database at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory cannot be created or the
    /// database cannot be opened or migrated.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
            }
        }

        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    /// Creates an in-memory cache (for testing).
    pub fn in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        run_migrations(&conn)?;
        Ok(Self {
            conn,
            max_age: DEFAULT_MAX_AGE,
        })
    }

    /// Sets the freshness threshold.
    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = max_age;
        self
    }

    pub fn max_age(&self) -> Duration {
        self.max_age
    }

    /// Reads the current snapshot for `browser`.
    pub fn read(&self, browser: Browser) -> Result<CacheLookup> {
        self.read_at(browser, Utc::now())
    }

    /// Reads the snapshot for `browser`, judging freshness against `now`.
    pub fn read_at(&self, browser: Browser, now: DateTime<Utc>) -> Result<CacheLookup> {
        let scanned_at: Option<i64> = self
            .conn
            .query_row(
                "SELECT scanned_at FROM snapshots WHERE browser = ?1",
                params![browser.as_str()],
                |row| row.get(0),
            )
            .optional()?;

        let Some(scanned_at) = scanned_at else {
            return Ok(CacheLookup::Missing);
        };

        let mut stmt = self.conn.prepare(&format!(
            "SELECT id, name, version, enabled, profile, profile_name
             FROM {} WHERE scanned_at = ?1 ORDER BY rowid",
            table_name(browser)
        ))?;
        let extensions = stmt
            .query_map(params![scanned_at], |row| {
                Ok(Extension {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    version: row.get(2)?,
                    enabled: row.get(3)?,
                    browser,
                    profile: row.get(4)?,
                    profile_name: row.get(5)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let age_secs = now.timestamp() - scanned_at;
        let snapshot = Snapshot {
            browser,
            extensions,
            scanned_at: Utc
                .timestamp_opt(scanned_at, 0)
                .single()
                .unwrap_or_default(),
            age: Duration::from_secs(u64::try_from(age_secs).unwrap_or(0)),
        };

        // A snapshot stamped in the future means the clock moved; rescan.
        if age_secs < 0 || snapshot.age > self.max_age {
            debug!(%browser, age_secs, "cached snapshot is stale");
            Ok(CacheLookup::Stale(snapshot))
        } else {
            debug!(%browser, age_secs, count = snapshot.extensions.len(), "cached snapshot is fresh");
            Ok(CacheLookup::Fresh(snapshot))
        }
    }

    /// Replaces the snapshot for `browser`, stamped with the current time.
    pub fn write(&mut self, browser: Browser, extensions: &[Extension]) -> Result<()> {
        self.write_at(browser, extensions, Utc::now())
    }

    /// Replaces the snapshot for `browser`, stamped with `now`.
    ///
    /// Records sharing an `(id, profile, version)` key collapse to the last
    /// one written.
    pub fn write_at(
        &mut self,
        browser: Browser,
        extensions: &[Extension],
        now: DateTime<Utc>,
    ) -> Result<()> {
        let table = table_name(browser);
        let stamp = now.timestamp();
        let tx = self.conn.transaction()?;

        tx.execute(&format!("DELETE FROM {table}"), [])?;
        {
            let mut insert = tx.prepare(&format!(
                "INSERT OR REPLACE INTO {table}
                 (id, name, browser, version, enabled, profile, profile_name, scanned_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"
            ))?;
            for ext in extensions {
                insert.execute(params![
                    ext.id,
                    ext.name,
                    ext.browser.display_name(),
                    ext.version,
                    ext.enabled,
                    ext.profile,
                    ext.profile_name,
                    stamp,
                ])?;
            }
        }
        tx.execute(
            "INSERT OR REPLACE INTO snapshots (browser, scanned_at) VALUES (?1, ?2)",
            params![browser.as_str(), stamp],
        )?;
        tx.commit()?;

        debug!(%browser, count = extensions.len(), "cache snapshot written");
        Ok(())
    }

    /// Removes every snapshot.
    pub fn clear(&mut self) -> Result<()> {
        let tx = self.conn.transaction()?;
        for browser in Browser::ALL {
            tx.execute(&format!("DELETE FROM {}", table_name(browser)), [])?;
        }
        tx.execute("DELETE FROM snapshots", [])?;
        tx.commit()?;
        Ok(())
    }
}

fn table_name(browser: Browser) -> &'static str {
    match browser {
        Browser::Chrome => "chrome_extensions",
        Browser::Edge => "edge_extensions",
        Browser::Firefox => "firefox_extensions",
    }
}

fn run_migrations(conn: &Connection) -> Result<()> {
    let version: i32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;

    if version < 1 {
        migrate_v1(conn)?;
    }

    conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
    Ok(())
}

fn migrate_v1(conn: &Connection) -> Result<()> {
    for browser in Browser::ALL {
        conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {} (
                id TEXT NOT NULL,
                name TEXT NOT NULL,
                browser TEXT NOT NULL,
                version TEXT NOT NULL,
                enabled INTEGER NOT NULL,
                profile TEXT NOT NULL,
                profile_name TEXT,
                scanned_at INTEGER NOT NULL,
                PRIMARY KEY (id, profile, version)
            );",
            table_name(browser)
        ))?;
    }

    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS snapshots (
            browser TEXT PRIMARY KEY,
            scanned_at INTEGER NOT NULL
        );",
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;
    use tempfile::TempDir;

    fn sample() -> Vec<Extension> {
        vec![
            Extension::new("aaa", "Alpha", "1.0", Browser::Chrome).with_profile("Default"),
            Extension::new("aaa", "Alpha", "1.0", Browser::Chrome)
                .with_profile("Profile 1")
                .with_profile_name(Some("Work".into())),
            Extension::new("aaa", "Alpha", "1.1", Browser::Chrome).with_profile("Default"),
        ]
    }

    #[test]
    fn test_missing_before_first_write() {
        let cache = ResultCache::in_memory().unwrap();
        assert_eq!(cache.read(Browser::Chrome).unwrap(), CacheLookup::Missing);
    }

    #[test]
    fn test_round_trip_within_window() {
        let mut cache = ResultCache::in_memory().unwrap();
        let now = Utc::now();
        cache.write_at(Browser::Chrome, &sample(), now).unwrap();

        let lookup = cache
            .read_at(Browser::Chrome, now + TimeDelta::minutes(29))
            .unwrap();
        let CacheLookup::Fresh(snapshot) = lookup else {
            panic!("expected fresh snapshot, got {lookup:?}");
        };
        assert_eq!(snapshot.extensions, sample());
        assert_eq!(snapshot.scanned_at.timestamp(), now.timestamp());
        assert_eq!(snapshot.age, Duration::from_secs(29 * 60));
    }

    #[test]
    fn test_stale_after_window() {
        let mut cache = ResultCache::in_memory().unwrap();
        let now = Utc::now();
        cache.write_at(Browser::Edge, &[], now).unwrap();

        let lookup = cache
            .read_at(Browser::Edge, now + TimeDelta::minutes(31))
            .unwrap();
        assert!(matches!(lookup, CacheLookup::Stale(_)));
        assert!(lookup.into_fresh().is_none());
    }

    #[test]
    fn test_future_stamp_is_stale() {
        let mut cache = ResultCache::in_memory().unwrap();
        let now = Utc::now();
        cache.write_at(Browser::Edge, &[], now).unwrap();

        let lookup = cache
            .read_at(Browser::Edge, now - TimeDelta::minutes(5))
            .unwrap();
        assert!(matches!(lookup, CacheLookup::Stale(_)));
    }

    #[test]
    fn test_custom_max_age() {
        let mut cache = ResultCache::in_memory()
            .unwrap()
            .with_max_age(Duration::from_secs(60));
        let now = Utc::now();
        cache.write_at(Browser::Firefox, &[], now).unwrap();

        assert!(matches!(
            cache.read_at(Browser::Firefox, now + TimeDelta::seconds(61)).unwrap(),
            CacheLookup::Stale(_)
        ));
    }

    #[test]
    fn test_empty_snapshot_is_fresh() {
        let mut cache = ResultCache::in_memory().unwrap();
        cache.write(Browser::Firefox, &[]).unwrap();
        assert_eq!(
            cache.read(Browser::Firefox).unwrap().into_fresh(),
            Some(Vec::new())
        );
    }

    #[test]
    fn test_write_replaces_previous_snapshot() {
        let mut cache = ResultCache::in_memory().unwrap();
        let now = Utc::now();
        cache.write_at(Browser::Chrome, &sample(), now).unwrap();

        let replacement = vec![Extension::new("zzz", "Zed", "9", Browser::Chrome)];
        cache
            .write_at(Browser::Chrome, &replacement, now + TimeDelta::seconds(10))
            .unwrap();

        let fresh = cache
            .read_at(Browser::Chrome, now + TimeDelta::seconds(20))
            .unwrap()
            .into_fresh()
            .unwrap();
        assert_eq!(fresh, replacement);
    }

    #[test]
    fn test_duplicate_keys_collapse() {
        let mut cache = ResultCache::in_memory().unwrap();
        let first = Extension::new("dup", "First", "1", Browser::Chrome).with_profile("Default");
        let second = Extension::new("dup", "Second", "1", Browser::Chrome).with_profile("Default");
        cache.write(Browser::Chrome, &[first, second]).unwrap();

        let fresh = cache.read(Browser::Chrome).unwrap().into_fresh().unwrap();
        assert_eq!(fresh.len(), 1);
        assert_eq!(fresh[0].name, "Second");
    }

    #[test]
    fn test_browsers_are_isolated() {
        let mut cache = ResultCache::in_memory().unwrap();
        cache.write(Browser::Chrome, &sample()).unwrap();

        assert_eq!(cache.read(Browser::Edge).unwrap(), CacheLookup::Missing);
        assert_eq!(cache.read(Browser::Firefox).unwrap(), CacheLookup::Missing);
    }

    #[test]
    fn test_clear() {
        let mut cache = ResultCache::in_memory().unwrap();
        cache.write(Browser::Chrome, &sample()).unwrap();
        cache.clear().unwrap();
        assert_eq!(cache.read(Browser::Chrome).unwrap(), CacheLookup::Missing);
    }

    #[test]
    fn test_persists_across_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("inventory.db");

        {
            let mut cache = ResultCache::open(&path).unwrap();
            let ext = Extension::new("f@x", "F", "1", Browser::Firefox).with_enabled(false);
            cache.write(Browser::Firefox, &[ext]).unwrap();
        }

        let cache = ResultCache::open(&path).unwrap();
        let fresh = cache.read(Browser::Firefox).unwrap().into_fresh().unwrap();
        assert_eq!(fresh.len(), 1);
        assert!(!fresh[0].enabled);
    }
}
