//! deadlink-scraper main entry point
//!
//! This is the command-line interface for the deadlink-scraper link checker.

use anyhow::Context;
use clap::Parser;
use deadlink_scraper::config::{load_config, parse_duration, validate, Config};
use deadlink_scraper::crawler::crawl;
use deadlink_scraper::output::{generate_markdown_report, print_report};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// deadlink-scraper: a concurrent dead-link crawler
///
/// Crawls every page of a website reachable from the seed URL, checks each
/// discovered link once and reports which ones are dead.
#[derive(Parser, Debug)]
#[command(name = "deadlink-scraper")]
#[command(version)]
#[command(about = "A concurrent dead-link crawler", long_about = None)]
struct Cli {
    /// Start URL of the crawl (https:// is assumed when omitted)
    #[arg(value_name = "SEED")]
    seed: String,

    /// Number of concurrent workers
    #[arg(short, long)]
    concurrency: Option<usize>,

    /// Timeout of each request (e.g. 500ms, 5s, 1m)
    #[arg(short, long, value_parser = parse_timeout)]
    timeout: Option<Duration>,

    /// Path to TOML configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Write a markdown report to this file
    #[arg(long, value_name = "FILE")]
    report: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = build_config(&cli)?;

    tracing::info!(
        "Workers: {}, timeout: {:?}, user agent: {}",
        config.crawler.concurrency,
        config.crawler.timeout(),
        config.user_agent.header_value()
    );

    let report = match crawl(&config, &cli.seed).await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            return Err(e.into());
        }
    };

    if !cli.quiet {
        print_report(&report);
    }

    if let Some(path) = &config.output.report_path {
        generate_markdown_report(&report, Path::new(path))
            .with_context(|| format!("failed to write report to {}", path))?;
    }

    Ok(())
}

/// Loads the configuration file (if any) and applies command-line overrides
fn build_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)
                .with_context(|| format!("failed to load configuration from {}", path.display()))?
        }
        None => Config::default(),
    };

    if let Some(concurrency) = cli.concurrency {
        config.crawler.concurrency = concurrency;
    }
    if let Some(timeout) = cli.timeout {
        config.crawler.timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
    }
    if let Some(report) = &cli.report {
        config.output.report_path = Some(report.display().to_string());
    }

    validate(&config).context("invalid configuration")?;
    Ok(config)
}

fn parse_timeout(input: &str) -> Result<Duration, String> {
    parse_duration(input).map_err(|e| e.to_string())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("deadlink_scraper=info,warn"),
            1 => EnvFilter::new("deadlink_scraper=debug,info"),
            2 => EnvFilter::new("deadlink_scraper=trace,debug"),
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
