//! Shelf-Harvest main entry point
//!
//! This is the command-line interface for the Shelf-Harvest bookstore
//! harvester.

use anyhow::Context;
use clap::Parser;
use shelf_harvest::config::{load_config_with_hash, Config, SearchContext};
use shelf_harvest::crawler::run_harvest;
use shelf_harvest::output::print_summary;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Shelf-Harvest: a bookstore search-results harvester
///
/// Shelf-Harvest fetches every page of a bookstore search, extracts one
/// record per listed book, and writes the catalog as timestamped JSON and
/// CSV files.
#[derive(Parser, Debug)]
#[command(name = "shelf-harvest")]
#[command(version = "1.0.0")]
#[command(about = "A bookstore search-results harvester", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file (defaults apply without one)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Search query
    #[arg(long)]
    query: Option<String>,

    /// Number of concurrent page fetch workers
    #[arg(short, long)]
    workers: Option<u32>,

    /// Directory for raw pages during the run
    #[arg(long, value_name = "DIR")]
    scratch_dir: Option<String>,

    /// Directory the JSON and CSV results are written to
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<String>,

    /// Keep the scratch directory after a successful run
    #[arg(long)]
    keep_scratch: bool,

    /// Show the resolved configuration and request URLs without fetching
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    /// Applies command-line overrides on top of the file configuration
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(query) = &self.query {
            config.search.query = query.clone();
        }
        if let Some(workers) = self.workers {
            config.crawler.worker_count = workers;
        }
        if let Some(dir) = &self.scratch_dir {
            config.output.scratch_dir = dir.clone();
        }
        if let Some(dir) = &self.output_dir {
            config.output.output_dir = dir.clone();
        }
        if self.keep_scratch {
            config.output.keep_scratch = true;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => {
            tracing::info!("No configuration file given, using defaults");
            Config::default()
        }
    };
    cli.apply_overrides(&mut config);

    let context = Arc::new(SearchContext::new(config).context("invalid configuration")?);

    if cli.dry_run {
        handle_dry_run(&context);
        return Ok(());
    }

    handle_harvest(context, cli.quiet).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("shelf_harvest=info,warn"),
            1 => EnvFilter::new("shelf_harvest=debug,info"),
            2 => EnvFilter::new("shelf_harvest=trace,debug"),
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

/// Handles the --dry-run mode: shows what would be fetched
fn handle_dry_run(context: &SearchContext) {
    println!("=== Shelf-Harvest Dry Run ===\n");

    println!("Search:");
    println!("  Query: {}", context.query());
    println!("  Origin: {}", context.origin());
    println!("  Page 1: {}", context.page_url(1));
    println!("  Page 2: {}", context.page_url(2));

    println!("\nCrawler:");
    println!("  Workers: {}", context.worker_count());
    println!("  Request timeout: {:?}", context.request_timeout());
    println!("  Connect timeout: {:?}", context.connect_timeout());
    println!(
        "  User agent: {}",
        context
            .user_agent()
            .unwrap_or(shelf_harvest::crawler::DEFAULT_USER_AGENT)
    );

    println!("\nOutput:");
    println!("  Scratch directory: {}", context.scratch_dir().display());
    println!("  Output directory: {}", context.output_dir().display());
    println!("  Keep scratch: {}", context.keep_scratch());

    println!("\n✓ Configuration is valid");
}

/// Handles the main harvest operation
async fn handle_harvest(context: Arc<SearchContext>, quiet: bool) -> anyhow::Result<()> {
    match run_harvest(context).await {
        Ok(summary) => {
            if !quiet {
                print_summary(&summary);
            }
            Ok(())
        }
        Err(e) => {
            tracing::error!("Harvest failed: {}", e);
            Err(e).context("harvest aborted")
        }
    }
}
