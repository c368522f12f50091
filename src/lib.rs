pub mod cache;
pub mod config;
pub mod discovery;
pub mod error;
pub mod locale;
pub mod logging;
pub mod model;
pub mod output;
pub mod platform;
pub mod scanner;

pub use cache::ResultCache;
pub use config::Config;
pub use discovery::{Discovery, DiscoveryCoordinator};
pub use error::{Error, Result};
pub use model::{Browser, Extension, Inventory, Platform};
pub use scanner::Scanner;
