//! Resolution of `__MSG_<key>__` placeholders.
//!
//! Extension manifests may reference localized strings instead of carrying
//! literal text. The key is looked up in `_locales/<locale>/messages.json`
//! following a fixed fallback chain, stopping at the first hit:
//!
//! 1. the manifest's `default_locale`
//! 2. `en`, then `en_US`
//! 3. every other locale directory, in file-name order
//!
//! Each locale is probed with the key's original case first, then its
//! lower-cased form. When nothing matches, the bare key is returned so the
//! caller always has something non-empty to display.
//!
//! Locale tables are loaded through [`MessageSource`] so the chain can be
//! exercised without real files; [`LocaleDir`] is the on-disk source.

use crate::scanner::subdirectories;
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const PLACEHOLDER_PREFIX: &str = "__MSG_";
const PLACEHOLDER_SUFFIX: &str = "__";
const ENGLISH_LOCALES: [&str; 2] = ["en", "en_US"];

/// Message key to message text for a single locale.
pub type MessageTable = HashMap<String, String>;

/// Supplies locale message tables to the resolver.
pub trait MessageSource {
    /// Loads the table for `locale`. Missing or malformed tables are `None`.
    fn load(&self, locale: &str) -> Option<MessageTable>;

    /// Lists every locale the source knows about.
    fn locales(&self) -> Vec<String>;
}

/// Reads message tables from an extension's `_locales` directory.
pub struct LocaleDir {
    dir: PathBuf,
}

impl LocaleDir {
    /// Creates a source rooted at `<extension_root>/_locales`.
    pub fn for_extension(extension_root: &Path) -> Self {
        Self {
            dir: extension_root.join("_locales"),
        }
    }
}

impl MessageSource for LocaleDir {
    fn load(&self, locale: &str) -> Option<MessageTable> {
        let path = self.dir.join(locale).join("messages.json");
        let content = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "locale file unreadable");
                return None;
            }
        };
        match parse_messages(&content) {
            Some(table) => Some(table),
            None => {
                debug!(path = %path.display(), "locale file is not a message table");
                None
            }
        }
    }

    fn locales(&self) -> Vec<String> {
        subdirectories(&self.dir)
            .into_iter()
            .map(|(name, _)| name)
            .collect()
    }
}

/// Parses a `messages.json` body of the form `{"key": {"message": "text"}}`.
///
/// Entries without a string `message` are ignored rather than failing the
/// whole table. Returns `None` if the body is not a JSON object.
pub fn parse_messages(content: &str) -> Option<MessageTable> {
    let value: Value = serde_json::from_str(content).ok()?;
    let entries = value.as_object()?;

    Some(
        entries
            .iter()
            .filter_map(|(key, entry)| {
                let message = entry.get("message")?.as_str()?;
                Some((key.clone(), message.to_string()))
            })
            .collect(),
    )
}

/// Extracts the key from a `__MSG_<key>__` placeholder.
///
/// Returns `None` for anything that is not a well-formed placeholder,
/// including an empty key.
pub fn placeholder_key(input: &str) -> Option<&str> {
    input
        .strip_prefix(PLACEHOLDER_PREFIX)?
        .strip_suffix(PLACEHOLDER_SUFFIX)
        .filter(|key| !key.is_empty())
}

/// Resolves `input` to display text.
///
/// Non-placeholder input is returned unchanged.
///
/// ```
/// use browser_inventory::locale::{resolve_message, MessageSource, MessageTable};
///
/// struct Fixed;
/// impl MessageSource for Fixed {
///     fn load(&self, locale: &str) -> Option<MessageTable> {
///         (locale == "en").then(|| [("appName".to_string(), "Grammarly".to_string())].into())
///     }
///     fn locales(&self) -> Vec<String> {
///         vec!["en".to_string()]
///     }
/// }
///
/// assert_eq!(resolve_message("__MSG_appName__", None, &Fixed), "Grammarly");
/// assert_eq!(resolve_message("__MSG_missing__", None, &Fixed), "missing");
/// assert_eq!(resolve_message("Plain Name", None, &Fixed), "Plain Name");
/// ```
pub fn resolve_message(
    input: &str,
    default_locale: Option<&str>,
    source: &dyn MessageSource,
) -> String {
    let Some(key) = placeholder_key(input) else {
        return input.to_string();
    };
    let lower = key.to_lowercase();
    let default_locale = default_locale.filter(|l| !l.is_empty());

    if let Some(locale) = default_locale {
        if let Some(message) = lookup(source, locale, key, &lower) {
            debug!(key, locale, "resolved from default locale");
            return message;
        }
    }

    for locale in ENGLISH_LOCALES {
        if Some(locale) == default_locale {
            continue;
        }
        if let Some(message) = lookup(source, locale, key, &lower) {
            debug!(key, locale, "resolved from English fallback");
            return message;
        }
    }

    for locale in source.locales() {
        if Some(locale.as_str()) == default_locale || ENGLISH_LOCALES.contains(&locale.as_str())
        {
            continue;
        }
        if let Some(message) = lookup(source, &locale, key, &lower) {
            debug!(key, locale = %locale, "resolved from other locale");
            return message;
        }
    }

    debug!(key, "no locale carries this message");
    key.to_string()
}

/// Looks up the original-case key, then the lower-cased key, in one locale.
fn lookup(source: &dyn MessageSource, locale: &str, key: &str, lower: &str) -> Option<String> {
    let table = source.load(locale)?;
    let non_empty = |k: &str| table.get(k).filter(|message| !message.is_empty());
    non_empty(key).or_else(|| non_empty(lower)).cloned()
}
