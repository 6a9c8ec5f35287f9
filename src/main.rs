//! Meshcrawl main entry point
//!
//! Command-line interface for running a crawl from a seeds file.

use anyhow::{bail, Context};
use clap::Parser;
use meshcrawl::config::load_config_with_hash;
use meshcrawl::crawler::crawl;
use meshcrawl::Config;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Meshcrawl: a cooperative, deduplicating web crawler
///
/// Meshcrawl fetches pages starting from a seeds file while respecting
/// robots.txt and per-domain rate limits, stores content in a
/// deduplicating block store, and detects changes between crawl passes.
#[derive(Parser, Debug)]
#[command(name = "meshcrawl")]
#[command(version)]
#[command(about = "A cooperative, deduplicating web crawler", long_about = None)]
struct Cli {
    /// Path to a file with one seed URL per line
    #[arg(value_name = "SEEDS")]
    seeds: PathBuf,

    /// Path to TOML configuration file (defaults are used if omitted)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Stop after this many pages (0 = unlimited)
    #[arg(long, default_value_t = 10_000)]
    max_pages: usize,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_logging(cli.verbose, cli.quiet);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)?;
            tracing::info!("Configuration loaded (hash: {})", hash);
            config
        }
        None => {
            tracing::info!("No configuration file given, using defaults");
            Config::default()
        }
    };

    if config.dht.enabled {
        tracing::warn!(
            "dht.enabled is set, but this binary runs standalone; \
             peer transports attach through the library API"
        );
    }

    let seeds = load_seeds(&cli.seeds)?;
    tracing::info!(
        "Loaded {} seed URLs from {}",
        seeds.len(),
        cli.seeds.display()
    );

    let summary = crawl(config, seeds, cli.max_pages, None).await?;
    println!("Crawl finished: {}", summary);
    Ok(())
}

/// Reads seed URLs, one per line; blank lines and `#` comments are skipped
///
/// An empty seed set is an error: a crawl with nothing to do is almost
/// always a mistyped path.
fn load_seeds(path: &PathBuf) -> anyhow::Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Could not read seeds file {}", path.display()))?;

    let seeds: Vec<String> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect();

    if seeds.is_empty() {
        bail!("Seeds file {} contains no URLs", path.display());
    }

    Ok(seeds)
}

/// Sets up the logging subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("meshcrawl=info,warn"),
            1 => EnvFilter::new("meshcrawl=debug,info"),
            2 => EnvFilter::new("meshcrawl=trace,debug"),
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
