//! webspider main entry point
//!
//! This is the command-line interface for the webspider single-site crawler.

use anyhow::{bail, Context};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use webspider::config::{load_config_with_hash, Config};
use webspider::crawler::{CrawlOutcome, Crawler};
use webspider::events::TracingListener;
use webspider::output::{link_file_path, load_statistics, print_statistics};
use webspider::robots::robots_url_for;
use webspider::{Address, Disposition};

/// webspider: a polite single-site link crawler
///
/// webspider crawls one site breadth-first from a seed address, respecting
/// robots.txt, and sorts every address it meets into local, external, dead,
/// non-parsable and disallowed link files.
#[derive(Parser, Debug)]
#[command(name = "webspider")]
#[command(version = "1.0.0")]
#[command(about = "A polite single-site link crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults are used when omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Seed address, overriding `[crawler] seed` from the configuration
    #[arg(long, value_name = "URL")]
    seed: Option<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show counts from previously exported link files and exit
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
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => {
            tracing::info!("No configuration file given, using defaults");
            Config::default()
        }
    };

    let seed = resolve_seed(&cli, &config)?;

    if cli.dry_run {
        handle_dry_run(&config, &seed)
    } else if cli.stats {
        handle_stats(&config, &seed)
    } else {
        handle_crawl(&config, seed).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("webspider=info,warn"),
            1 => EnvFilter::new("webspider=debug,info"),
            2 => EnvFilter::new("webspider=trace,debug"),
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

/// Picks the seed from the command line, falling back to the configuration
fn resolve_seed(cli: &Cli, config: &Config) -> anyhow::Result<Address> {
    let Some(raw) = cli.seed.as_deref().or(config.crawler.seed.as_deref()) else {
        bail!("No seed address: pass --seed or set [crawler] seed in the configuration");
    };
    Address::parse_seed(raw).with_context(|| format!("Invalid seed address {}", raw))
}

/// Handles the --dry-run mode: validates config and shows what would be crawled
fn handle_dry_run(config: &Config, seed: &Address) -> anyhow::Result<()> {
    let base = seed.resolve("/")?;
    let robots_url = match &config.crawler.robots_url {
        Some(url) => url.clone(),
        None => robots_url_for(&base)?.to_string(),
    };

    println!("=== webspider Dry Run ===\n");

    println!("Crawl:");
    println!("  Seed: {}", seed);
    println!("  Local host: {}", base.host());
    println!("  Robots: {}", robots_url);
    match config.crawler.request_timeout() {
        Some(timeout) => println!("  Request timeout: {}s", timeout.as_secs()),
        None => println!("  Request timeout: transport default"),
    }

    println!("\nRequest Headers:");
    println!("  User-Agent: {}", config.request.user_agent);
    println!("  Accept-Language: {}", config.request.accept_language);
    println!("  Content-Type: {}", config.request.content_type);

    println!("\nOutput Files:");
    for disposition in Disposition::all() {
        let path = link_file_path(&config.output, base.host(), disposition);
        let note = if path.exists() {
            if config.output.overwrite {
                " (exists, will be replaced)"
            } else {
                " (exists, will be left untouched)"
            }
        } else {
            ""
        };
        println!("  {}{}", path.display(), note);
    }

    println!("\n✓ Configuration is valid");

    Ok(())
}

/// Handles the --stats mode: counts links in previously exported files
fn handle_stats(config: &Config, seed: &Address) -> anyhow::Result<()> {
    println!("Output directory: {}\n", config.output.directory_path().display());

    let stats = load_statistics(&config.output, seed.host())
        .context("Failed to read exported link files")?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the main crawl operation; Ctrl-C requests a cooperative stop
async fn handle_crawl(config: &Config, seed: Address) -> anyhow::Result<()> {
    let crawler = Arc::new(
        Crawler::spawn(config, seed, Arc::new(TracingListener))
            .context("Failed to start crawl")?,
    );

    let interrupt = {
        let crawler = Arc::clone(&crawler);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Interrupted, stopping after the current address");
                if let Err(e) = crawler.stop() {
                    tracing::warn!("Could not stop crawl: {}", e);
                }
            }
        })
    };

    let outcome = crawler.wait().await;
    interrupt.abort();

    let stats = crawler.stats();
    match outcome.context("Crawl failed")? {
        CrawlOutcome::Completed { report } => {
            tracing::info!(
                "Crawl completed: {} local, {} external, {} dead, {} non-parsable, {} disallowed",
                stats.local,
                stats.external,
                stats.dead,
                stats.non_parsable,
                stats.disallowed
            );
            for path in &report.skipped {
                tracing::warn!("Not overwritten: {}", path.display());
            }
        }
        CrawlOutcome::Stopped => {
            tracing::info!(
                "Crawl stopped with {} addresses classified and {} pending; nothing exported",
                stats.total(),
                stats.frontier
            );
        }
    }

    Ok(())
}
