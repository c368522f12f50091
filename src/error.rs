//! Error taxonomy for discovery.
//!
//! Errors fall into three tiers:
//!
//! - **Fatal**: the run cannot continue ([`Error::HomeDirUnavailable`],
//!   [`Error::Cache`] while opening the cache, [`Error::Serialize`]). Cache
//!   reads and writes during discovery are logged and bypassed instead.
//! - **Per-browser**: the browser contributes zero records and discovery moves
//!   on ([`Error::UnsupportedPlatform`], [`Error::ProfileRootMissing`],
//!   [`Error::Io`]).
//! - **Per-item**: never surfaced as an `Error` at all; scanners skip the item
//!   and log at debug level.

use crate::model::Browser;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("could not determine the user's home directory")]
    HomeDirUnavailable,

    #[error("unsupported platform for browser {browser}")]
    UnsupportedPlatform { browser: Browser },

    #[error("{browser} profile root not found at {}", .path.display())]
    ProfileRootMissing { browser: Browser, path: PathBuf },

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unknown browser '{0}'. Use: chrome, edge, firefox")]
    UnknownBrowser(String),

    #[error("cache error: {0}")]
    Cache(#[from] rusqlite::Error),

    #[error("failed to serialize results: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns true if this error must abort the whole run.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::HomeDirUnavailable | Error::Cache(_) | Error::Serialize(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
