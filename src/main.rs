//! Bookscrape main entry point
//!
//! This is the command-line interface for the bookscrape catalog scraper.

use bookscrape::config::load_config;
use bookscrape::scrape::run_scrape;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Bookscrape: a polite book-catalog scraper
///
/// Bookscrape walks a paginated book catalog, visits each book's detail
/// page, and exports the combined records as a date-stamped CSV dataset.
/// Separate modes summarize and clean previously exported datasets.
#[derive(Parser, Debug)]
#[command(name = "bookscrape")]
#[command(version = "1.0.0")]
#[command(about = "A polite book-catalog scraper", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be scraped without fetching
    #[arg(long, conflicts_with_all = ["stats", "clean"])]
    dry_run: bool,

    /// Show statistics for a raw dataset and exit
    #[arg(long, conflicts_with_all = ["dry_run", "clean"])]
    stats: bool,

    /// Clean a raw dataset and exit
    #[arg(long, conflicts_with_all = ["dry_run", "stats"])]
    clean: bool,

    /// Dataset file to use with --stats or --clean (default: newest raw export)
    #[arg(long, value_name = "FILE")]
    input: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = match load_config(&cli.config) {
        Ok(cfg) => {
            tracing::info!("Configuration loaded successfully");
            cfg
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    // Handle different modes
    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.stats {
        handle_stats(&config, cli.input.as_deref())?;
    } else if cli.clean {
        handle_clean(&config, cli.input.as_deref()).await?;
    } else {
        handle_scrape(&config).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("bookscrape=info,warn"),
            1 => EnvFilter::new("bookscrape=debug,info"),
            2 => EnvFilter::new("bookscrape=trace,debug"),
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

/// Picks the dataset a mode operates on: an explicit file or the newest export
fn resolve_input(
    config: &bookscrape::config::Config,
    input: Option<&std::path::Path>,
) -> Result<PathBuf, Box<dyn std::error::Error>> {
    use bookscrape::output::latest_dataset;
    use std::path::Path;

    match input {
        Some(path) => Ok(path.to_path_buf()),
        None => Ok(latest_dataset(Path::new(&config.output.raw_dir))?),
    }
}

/// Handles the --dry-run mode: validates config and shows the scrape plan
fn handle_dry_run(config: &bookscrape::config::Config) {
    println!("=== Bookscrape Dry Run ===\n");

    println!("Scraper Configuration:");
    println!("  Start URL: {}", config.scraper.base_url);
    println!("  Max pages: {}", config.scraper.max_pages);
    println!("  Request delay: {}ms", config.scraper.request_delay_ms);
    println!("  Fetch retries: {}", config.scraper.fetch_retries);
    println!("  User agent: {}", config.scraper.user_agent);

    println!("\nOutput:");
    println!("  Raw datasets: {}", config.output.raw_dir);
    println!("  Clean datasets: {}", config.output.clean_dir);

    println!("\nCleaning:");
    match config.cleaning.gbp_to_usd_rate {
        Some(rate) => println!("  Exchange rate: {} (pinned)", rate),
        None => println!("  Exchange rate: fetched when cleaning runs"),
    }

    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would scrape up to {} listing pages starting at {}",
        config.scraper.max_pages, config.scraper.base_url
    );
}

/// Handles the --stats mode: summarizes a raw dataset
fn handle_stats(
    config: &bookscrape::config::Config,
    input: Option<&std::path::Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    use bookscrape::output::{print_summary, read_dataset, DatasetSummary};

    let path = resolve_input(config, input)?;
    println!("Dataset: {}\n", path.display());

    let records = read_dataset(&path)?;
    let summary = DatasetSummary::compute(&records);
    print_summary(&summary);

    Ok(())
}

/// Handles the --clean mode: cleans a raw dataset
async fn handle_clean(
    config: &bookscrape::config::Config,
    input: Option<&std::path::Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    use bookscrape::cleaner::{print_clean_report, run_clean};

    let path = resolve_input(config, input)?;

    println!("=== Cleaning Dataset ===\n");
    println!("Input: {}", path.display());
    println!();

    let (report, output_path) = match run_clean(config, &path).await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!("Cleaning failed: {}", e);
            return Err(e.into());
        }
    };

    print_clean_report(&report);
    println!("\n✓ Clean dataset written to: {}", output_path.display());

    Ok(())
}

/// Handles the main scrape operation
async fn handle_scrape(
    config: &bookscrape::config::Config,
) -> Result<(), Box<dyn std::error::Error>> {
    use bookscrape::output::{export_records, print_summary, DatasetSummary};
    use bookscrape::scrape::CrawlStatus;
    use std::path::Path;

    tracing::info!(
        "Scraping up to {} listing pages from {}",
        config.scraper.max_pages,
        config.scraper.base_url
    );

    let report = match run_scrape(config).await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!("Scrape failed: {}", e);
            return Err(e.into());
        }
    };

    let path = export_records(&report.records, Path::new(&config.output.raw_dir))?;

    println!("=== Scrape Results ===\n");
    println!("Overview:");
    println!("  Status: {}", report.status);
    println!("  Pages visited: {}", report.pages_visited);
    println!("  Records extracted: {}", report.records.len());
    println!("  Items skipped: {}", report.item_failures.len());
    println!("  Page failures: {}", report.page_failures.len());
    println!();

    if !report.page_failures.is_empty() {
        println!("Failed Pages:");
        for failure in &report.page_failures {
            println!("  - {}: {}", failure.url, failure.message);
        }
        println!();
    }

    if !report.item_failures.is_empty() {
        println!("Skipped Items:");
        for failure in &report.item_failures {
            println!("  - {} ({}): {}", failure.url, failure.stage, failure.message);
        }
        println!();
    }

    let summary = DatasetSummary::compute(&report.records);
    print_summary(&summary);
    println!();

    println!("✓ Dataset written to: {}", path.display());
    match report.status {
        CrawlStatus::Completed => println!("✓ Scrape completed"),
        CrawlStatus::Incomplete => {
            println!("✗ Scrape incomplete: some listing pages could not be fetched")
        }
    }

    Ok(())
}
