//! Site-Tree main entry point
//!
//! This is the command-line interface for the Site-Tree site mapper.

use clap::Parser;
use site_tree::config::{load_config_with_hash, validate, validate_seed_url, Config};
use site_tree::crawler::crawl;
use site_tree::output::{print_statistics, write_site_tree};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Site-Tree: a concurrent site mapper
///
/// Site-Tree crawls every page of a website reachable from the starting
/// address and writes a tree of its pages, with the external links and
/// images found on each one.
#[derive(Parser, Debug)]
#[command(name = "site-tree")]
#[command(version)]
#[command(about = "A concurrent site mapper", long_about = None)]
struct Cli {
    /// Address of the site to crawl (http or https)
    #[arg(value_name = "SITE")]
    site: String,

    /// Number of concurrent workers (overrides the config file)
    #[arg(short, long)]
    workers: Option<usize>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Where to write the site tree (overrides the config file)
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Print crawl statistics when done
    #[arg(long)]
    stats: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = match load_configuration(&cli) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e);
        }
    };

    let seed = match validate_seed_url(&cli.site) {
        Ok(seed) => seed,
        Err(e) => {
            tracing::error!("Invalid site address: {}", e);
            return Err(e.into());
        }
    };

    handle_crawl(&seed, &config, cli.stats).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("site_tree=info,warn"),
            1 => EnvFilter::new("site_tree=debug,info"),
            2 => EnvFilter::new("site_tree=trace,debug"),
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

/// Loads the config file if one was given, then applies command-line overrides
fn load_configuration(cli: &Cli) -> Result<Config, Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => {
            tracing::debug!("No configuration file given, using defaults");
            Config::default()
        }
    };

    if let Some(workers) = cli.workers {
        config.crawler.workers = workers;
    }
    if let Some(output) = &cli.output {
        config.output.sitemap_path = output.display().to_string();
    }

    validate(&config)?;
    Ok(config)
}

/// Handles the main crawl operation
async fn handle_crawl(
    seed: &str,
    config: &Config,
    show_stats: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(
        "Crawling {} with {} worker(s)",
        seed,
        config.crawler.workers
    );

    let report = match crawl(seed, config).await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            return Err(e.into());
        }
    };

    write_site_tree(&report.root, &PathBuf::from(&config.output.sitemap_path))?;

    if show_stats {
        print_statistics(&report);
    }

    Ok(())
}
