//! Provider-Harvest main entry point
//!
//! This is the command-line interface for the Provider-Harvest directory crawler.

use anyhow::Context;
use clap::Parser;
use provider_harvest::config::{load_config_with_hash, validate, Config};
use provider_harvest::crawler::run_crawl;
use provider_harvest::output::print_report;
use provider_harvest::Coordinator;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Provider-Harvest: a polite directory-site harvester
///
/// Provider-Harvest discovers the categories of a directory site, walks each
/// paginated listing, enriches every provider from its detail page, and
/// writes one JSON dataset keyed by category.
#[derive(Parser, Debug)]
#[command(name = "provider-harvest")]
#[command(version = "1.0.0")]
#[command(about = "A polite directory-site harvester", long_about = None)]
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

    /// Fetch the landing page and list the categories without crawling them
    #[arg(long)]
    dry_run: bool,

    /// Write the dataset here instead of the configured output path
    #[arg(long, value_name = "PATH")]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load configuration {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    apply_output_override(&mut config, cli.output.as_deref())?;

    if cli.dry_run {
        handle_dry_run(config).await
    } else {
        handle_crawl(config, config_hash, cli.quiet).await
    }
}

/// Points the dataset at `--output` and revalidates before anything is fetched
fn apply_output_override(config: &mut Config, output: Option<&Path>) -> anyhow::Result<()> {
    if let Some(output) = output {
        config.output.output_path = output.display().to_string();
        validate(config).with_context(|| format!("invalid --output {:?}", output))?;
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
            0 => EnvFilter::new("provider_harvest=info,warn"),
            1 => EnvFilter::new("provider_harvest=debug,info"),
            2 => EnvFilter::new("provider_harvest=trace,debug"),
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

/// Resolves once the process receives ctrl-c (or SIGTERM on unix)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}

/// Handles the --dry-run mode: discovers and prints the categories
async fn handle_dry_run(config: Config) -> anyhow::Result<()> {
    println!("=== Provider-Harvest Dry Run ===\n");

    println!("Site:");
    println!("  Root URL: {}", config.site.root_url);
    println!("  Volatile params: {}", config.site.volatile_params.join(", "));

    println!("\nCrawler Configuration:");
    println!("  Page size: {}", config.crawler.page_size);
    match config.crawler.record_ceiling {
        Some(ceiling) => println!("  Record ceiling: {}", ceiling),
        None => println!("  Record ceiling: none"),
    }
    println!("  Max pages per category: {}", config.crawler.max_pages);
    println!("  Request delay: {}ms", config.crawler.request_delay_ms);
    println!("  Detail workers: {}", config.crawler.worker_pool_size);

    println!("\nOutput:");
    println!("  Dataset: {}", config.output.output_path);
    if let Some(summary) = &config.output.summary_path {
        println!("  Report: {}", summary);
    }

    let mut coordinator = Coordinator::new(config).context("failed to build crawler")?;
    let categories = coordinator
        .discover()
        .await
        .context("category discovery failed")?;

    println!("\nCategories ({}):", categories.len());
    for category in &categories {
        match &category.listing_url {
            Some(url) => println!("  - {} -> {}", category.name, url),
            None => println!("  - {} (no listing link, would be skipped)", category.name),
        }
    }

    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would crawl {} categories",
        categories.iter().filter(|c| c.is_crawlable()).count()
    );

    Ok(())
}

/// Handles the main harvest operation
async fn handle_crawl(config: Config, config_hash: String, quiet: bool) -> anyhow::Result<()> {
    tracing::info!(
        "Starting harvest of {} (page size {}, {} detail workers)",
        config.site.root_url,
        config.crawler.page_size,
        config.crawler.worker_pool_size
    );

    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        tracing::warn!("Received shutdown signal, stopping after in-flight requests");
        signal_cancel.cancel();
    });

    let outcome = run_crawl(config, Some(config_hash), cancel)
        .await
        .context("harvest failed")?;

    tracing::info!(
        "Harvest {}: {} records in {} categories",
        outcome.report.status(),
        outcome.result.total_records(),
        outcome.result.len()
    );

    if !quiet {
        print_report(&outcome.report);
    }

    Ok(())
}
