//! Pagesweep main entry point
//!
//! This is the command-line interface for the Pagesweep harvester.

use anyhow::Context;
use clap::Parser;
use pagesweep::config::{load_config_with_hash, select_categories, validate, Config};
use pagesweep::crawler::run_harvest;
use pagesweep::output::{load_statistics, print_statistics};
use pagesweep::storage::JsonFileStore;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Pagesweep: a resumable paginated-category harvester
///
/// Fetches every page of every category, extracts the records on each page,
/// and saves them after every page so an interrupted run resumes where it
/// stopped.
#[derive(Parser, Debug)]
#[command(name = "pagesweep")]
#[command(version)]
#[command(about = "A resumable paginated-category harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (built-in defaults when omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Only process these categories (repeatable)
    #[arg(short, long = "category", value_name = "KEY")]
    categories: Vec<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be harvested without fetching
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show what is already stored per category and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => {
            let config = Config::default();
            validate(&config).context("built-in configuration is invalid")?;
            tracing::info!("No configuration file given, using defaults");
            config
        }
    };

    if cli.dry_run {
        handle_dry_run(&config, &cli.categories)?;
    } else if cli.stats {
        handle_stats(&config, &cli.categories)?;
    } else {
        handle_harvest(&config, &cli.categories).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("pagesweep=info,warn"),
            1 => EnvFilter::new("pagesweep=debug,info"),
            2 => EnvFilter::new("pagesweep=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows the resolved configuration
fn handle_dry_run(config: &Config, only: &[String]) -> anyhow::Result<()> {
    let categories = select_categories(config, only).context("invalid --category list")?;

    println!("=== Pagesweep Dry Run ===\n");

    println!("Fetcher:");
    println!("  Concurrency limit: {}", config.fetcher.concurrency_limit);
    println!("  Max attempts: {}", config.fetcher.max_attempts);
    println!("  Request timeout: {}ms", config.fetcher.request_timeout_ms);
    println!("  Retry delay: {}ms", config.fetcher.retry_delay_ms);

    println!("\nTarget:");
    println!("  Base URL: {}", config.target.base_url);
    println!(
        "  Query: {}=<category>&{}=<page>",
        config.target.category_param, config.target.page_param
    );

    println!("\nSelectors:");
    println!("  Records container: {}", config.selectors.records_container);
    println!("  Record link: {}", config.selectors.record_link);
    println!("  Pagination link: {}", config.selectors.pagination_link);

    println!("\nOutput:");
    println!("  Directory: {}", config.output.directory);
    println!("  Error log: {}", config.output.error_log);
    println!("  Summary: {}", config.output.summary);

    println!("\nCategories ({}):", categories.len());
    for category in &categories {
        println!("  - {}", category);
    }

    println!("\n✓ Configuration is valid");
    Ok(())
}

/// Handles the --stats mode: reports stored pages per category
fn handle_stats(config: &Config, only: &[String]) -> anyhow::Result<()> {
    let repository = JsonFileStore::new(&config.output.directory);
    println!("Output directory: {}\n", repository.directory().display());

    let categories = select_categories(config, only).context("invalid --category list")?;
    let stats = load_statistics(&repository, &categories)?;
    print_statistics(&stats);
    Ok(())
}

/// Handles the main harvest
async fn handle_harvest(config: &Config, only: &[String]) -> anyhow::Result<()> {
    match run_harvest(config, only).await {
        Ok(summary) => {
            tracing::info!(
                "Harvest completed: {} categories, {} pages",
                summary.categories_processed,
                summary.total_pages
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!("Harvest failed: {}", e);
            Err(e.into())
        }
    }
}
