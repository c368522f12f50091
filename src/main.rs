use anyhow::Result;
use browser_inventory::{
    cache::ResultCache,
    config::Config,
    discovery::{BrowserOutcome, DiscoveryCoordinator, Origin},
    logging,
    model::{Browser, Inventory, Platform},
    output::{print_result, render, OutputFormat},
    platform::{browser_config, home_dir, resolve_profile_root},
};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::process::ExitCode;
use std::str::FromStr;
use std::time::Duration;

mod exit_codes {
    pub const SUCCESS: u8 = 0;
    pub const ERROR: u8 = 1;
}

#[derive(Parser)]
#[command(name = "browser-inventory")]
#[command(
    author,
    version,
    about = "List installed Chrome, Edge and Firefox extensions from on-disk profiles"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Discover installed extensions
    Scan {
        /// Browsers to inventory, comma-separated (chrome, edge, firefox)
        #[arg(short, long)]
        browser: Option<String>,

        /// Output format (text, table, json)
        #[arg(short, long)]
        format: Option<String>,

        /// Shorthand for --format json
        #[arg(long, conflicts_with = "format")]
        json: bool,

        /// Print diagnostics to stderr
        #[arg(short, long)]
        verbose: bool,

        /// Ignore cached results and rescan
        #[arg(long)]
        update_cache: bool,

        /// Write output to file
        #[arg(short, long)]
        output: Option<String>,
    },

    /// List supported browsers and where their profiles are expected
    ListBrowsers,

    /// Show or create config file
    Config {
        /// Generate default config file
        #[arg(long)]
        init: bool,

        /// Show config file path
        #[arg(long)]
        path: bool,
    },

    /// Clear the cache
    ClearCache,
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(exit_codes::ERROR)
        }
    }
}

fn run() -> Result<u8> {
    let cli = Cli::parse();
    let config = Config::load().unwrap_or_default();

    match cli.command {
        Commands::Scan {
            browser,
            format,
            json,
            verbose,
            update_cache,
            output,
        } => {
            logging::init(verbose);

            let format = if json {
                OutputFormat::Json
            } else {
                let format_str = format.unwrap_or_else(|| config.default_format.clone());
                OutputFormat::from_str(&format_str).map_err(|e| anyhow::anyhow!(e))?
            };

            run_scan(&config, browser, format, update_cache, output)
        }
        Commands::ListBrowsers => {
            list_browsers()?;
            Ok(exit_codes::SUCCESS)
        }
        Commands::Config { init, path } => {
            handle_config(init, path)?;
            Ok(exit_codes::SUCCESS)
        }
        Commands::ClearCache => {
            let mut cache = ResultCache::open(&config.cache_path())?;
            cache.clear()?;
            println!("Cache cleared.");
            Ok(exit_codes::SUCCESS)
        }
    }
}

fn run_scan(
    config: &Config,
    selection: Option<String>,
    format: OutputFormat,
    force_refresh: bool,
    output_file: Option<String>,
) -> Result<u8> {
    // Validate the selection before touching the filesystem.
    let selection = selection.unwrap_or_else(|| config.default_selection());
    let browsers = Browser::parse_selection(Some(&selection))?;

    let home = home_dir()?;
    let mut cache = ResultCache::open(&config.cache_path())?.with_max_age(config.cache_max_age());

    let progress = if format.is_interactive() && output_file.is_none() {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            pb.set_style(style);
        }
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message("Discovering extensions...");
        Some(pb)
    } else {
        None
    };

    let discovery = DiscoveryCoordinator::new(home, Platform::current())
        .with_cache(&mut cache)
        .force_refresh(force_refresh)
        .discover(&browsers)?;

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    for outcome in &discovery.outcomes {
        match outcome {
            BrowserOutcome::Failed { browser, reason } => {
                eprintln!("Warning: Failed to get {} extensions: {}", browser, reason);
            }
            BrowserOutcome::Found {
                browser,
                origin: Origin::Cache,
                count,
            } => {
                tracing::info!(%browser, count, "served from cache");
            }
            BrowserOutcome::Found { .. } => {}
        }
    }

    let inventory = Inventory::new(discovery.extensions);

    if let Some(path) = output_file {
        let rendered = render(&inventory, format)?;
        std::fs::write(&path, rendered)?;
        if format.is_interactive() {
            println!("Results written to: {}", path);
        }
    } else {
        print_result(&inventory, format)?;
    }

    Ok(exit_codes::SUCCESS)
}

fn list_browsers() -> Result<()> {
    let home = home_dir()?;
    let platform = Platform::current();

    println!("Supported browsers:");
    println!();

    for browser in Browser::ALL {
        let location = match resolve_profile_root(browser_config(browser), platform, &home) {
            Ok(path) => path.display().to_string(),
            Err(e) => e.to_string(),
        };

        println!("  {:<10} {}", browser.as_str(), browser.display_name());
        println!("  {:<10} Location: {}", "", location);
        println!();
    }

    Ok(())
}

fn handle_config(init: bool, show_path: bool) -> Result<()> {
    let config_path = Config::config_path();

    if show_path {
        println!("{}", config_path.display());
        return Ok(());
    }

    if init {
        if config_path.exists() {
            println!("Config file already exists at: {}", config_path.display());
            return Ok(());
        }

        let config = Config::default();
        config.save()?;
        println!("Created config file at: {}", config_path.display());
        println!();
        println!("Default configuration:");
        println!("{}", Config::generate_default_config());
        return Ok(());
    }

    if config_path.exists() {
        let content = std::fs::read_to_string(&config_path)?;
        println!("Config file: {}", config_path.display());
        println!();
        println!("{}", content);
    } else {
        println!("No config file found.");
        println!("Run 'browser-inventory config --init' to create one.");
        println!();
        println!("Config path: {}", config_path.display());
    }

    Ok(())
}
