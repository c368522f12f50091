//! Diagnostics output.
//!
//! Uses `tracing` with `tracing-subscriber`, writing to stderr so stdout
//! stays clean for reports and JSON.
//!
//! ## Environment Variables
//!
//! - `BROWSER_INVENTORY_LOG` or `RUST_LOG`: log filter (e.g. `debug`,
//!   `browser_inventory=trace`). Takes precedence over `--verbose`.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const LOG_ENV: &str = "BROWSER_INVENTORY_LOG";

/// Filter used when no environment override is set.
pub fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "browser_inventory=debug,warn"
    } else {
        "warn"
    }
}

/// Installs the global subscriber. Safe to call more than once; later calls
/// are ignored.
pub fn init(verbose: bool) {
    let filter = std::env::var(LOG_ENV)
        .ok()
        .or_else(|| std::env::var("RUST_LOG").ok())
        .and_then(|directive| EnvFilter::try_new(directive).ok())
        .unwrap_or_else(|| EnvFilter::new(default_filter(verbose)));

    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .compact();

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init();
}
