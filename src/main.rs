//! ShelfScan main entry point
//!
//! This is the command-line interface for the ShelfScan catalogue scraper.

use anyhow::Context;
use clap::Parser;
use shelf_scan::config::{load_or_default, validate, Config};
use shelf_scan::ShelfScan;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// ShelfScan: a concurrent catalogue scraper
///
/// ShelfScan discovers the listing pages of a paginated book catalogue,
/// scrapes every book on them and writes an analysis report together with
/// the raw data.
#[derive(Parser, Debug)]
#[command(name = "shelf-scan")]
#[command(version = "1.0.0")]
#[command(about = "A concurrent catalogue scraper", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults are used when omitted)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Override the URL discovery starts from
    #[arg(long, value_name = "URL")]
    seed_url: Option<String>,

    /// Override the number of pages discovery processes
    #[arg(long, value_name = "N")]
    max_pages: Option<usize>,

    /// Override the base path of the result files
    #[arg(short, long, value_name = "PATH")]
    output: Option<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate the configuration and show what would be scanned
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Scan failed: {:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = build_config(&cli)?;

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    handle_scan(config).await
}

/// Loads the configuration and applies command-line overrides
fn build_config(cli: &Cli) -> anyhow::Result<Config> {
    if let Some(path) = &cli.config {
        tracing::info!("Loading configuration from: {}", path.display());
    }

    let mut config =
        load_or_default(cli.config.as_deref()).context("failed to load configuration")?;

    if let Some(seed_url) = &cli.seed_url {
        config.crawler.seed_url = seed_url.clone();
    }
    if let Some(max_pages) = cli.max_pages {
        config.crawler.max_pages = max_pages;
    }
    if let Some(output) = &cli.output {
        config.output.results_path = output.clone();
    }

    validate(&config).context("invalid command-line override")?;
    Ok(config)
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("shelf_scan=info,warn"),
            1 => EnvFilter::new("shelf_scan=debug,info"),
            2 => EnvFilter::new("shelf_scan=trace,debug"),
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

/// Handles the --dry-run mode: shows the effective configuration
fn handle_dry_run(config: &Config) {
    println!("=== ShelfScan Dry Run ===\n");

    println!("Discovery:");
    println!("  Seed URL: {}", config.crawler.seed_url);
    println!("  Max pages: {}", config.crawler.max_pages);
    println!("  Workers: {}", config.crawler.worker_count());
    println!("  Queue capacity: {}", config.crawler.queue_capacity);
    println!("  Page pattern: {}", config.crawler.page_pattern);

    println!("\nPipeline:");
    println!("  Token budget: {}", config.crawler.token_budget());
    println!(
        "  Fetch attempts: {} (backoff base {}ms)",
        config.crawler.max_fetch_retries, config.crawler.backoff_base_ms
    );

    println!("\nHTTP:");
    println!("  Connect timeout: {}s", config.http.connect_timeout_secs);
    println!("  Request timeout: {}s", config.http.request_timeout_secs);
    println!("  Max redirects: {}", config.http.max_redirects);
    println!("  User agent: {}", config.http.user_agent);

    println!("\nOutput:");
    println!("  Report: {}.txt", config.output.results_path);
    println!("  Data: {}.json", config.output.results_path);

    println!("\n✓ Configuration is valid");
}

/// Handles the main scan: discover, scrape, analyze, save
async fn handle_scan(config: Config) -> anyhow::Result<()> {
    let scan = ShelfScan::new(config).context("failed to initialize scanner")?;

    tracing::info!("Starting discovery from {}", scan.config().crawler.seed_url);
    let urls = scan.discover().await.context("discovery failed")?;
    tracing::info!("Auto discovery completed. Found {} unique URLs", urls.len());

    scan.scrape(&urls).await.context("scraping failed")?;
    scan.print_statistics();

    let analysis = scan.analyze().await.context("analysis failed")?;
    let saved = scan
        .save_results(&analysis)
        .context("failed to save results")?;

    println!(
        "Results written to {} and {}",
        saved.report.display(),
        saved.books.display()
    );
    Ok(())
}
