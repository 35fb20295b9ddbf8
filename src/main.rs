//! Drivelog main entry point
//!
//! This is the command-line interface for the Drivelog profile exporter.

use anyhow::{bail, Context};
use clap::Parser;
use drivelog::config::{hash_content, load_config_with_hash, validate, Config};
use drivelog::crawler::run_crawl;
use drivelog::output::{
    generate_markdown_summary, generate_summary, load_statistics, print_statistics,
};
use drivelog::spider::seed;
use drivelog::storage::open_storage;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Drivelog: exports a car-blog profile with its vehicles and posts
///
/// Drivelog walks a user's profile, vehicles, logbooks, albums and posts,
/// and writes one record per page to a SQLite database, each tagged with
/// the vehicle it belongs to and the collection it was found in.
#[derive(Parser, Debug)]
#[command(name = "drivelog")]
#[command(version)]
#[command(about = "Exports a car-blog profile with its vehicles and posts", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// User whose profile is crawled (overrides [start] username)
    #[arg(short, long)]
    username: Option<String>,

    /// Page to start from instead of the profile (overrides [start] start-url)
    #[arg(long, value_name = "URL")]
    start_url: Option<String>,

    /// Export database path (overrides [output] database-path)
    #[arg(long, value_name = "PATH")]
    database: Option<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show where the crawl would start without crawling
    #[arg(long, conflicts_with_all = ["stats", "export_summary"])]
    dry_run: bool,

    /// Show statistics from the database and exit
    #[arg(long, conflicts_with_all = ["dry_run", "export_summary"])]
    stats: bool,

    /// Generate markdown summary from existing data and exit
    #[arg(long, conflicts_with_all = ["dry_run", "stats"])]
    export_summary: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let (mut config, config_hash) = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (config, hash)
        }
        None => {
            tracing::info!("No configuration file given, using defaults");
            (Config::default(), hash_content(""))
        }
    };

    apply_overrides(&mut config, &cli);
    validate(&config).context("Invalid configuration")?;

    if cli.dry_run {
        handle_dry_run(&config)?;
    } else if cli.stats {
        handle_stats(&config)?;
    } else if cli.export_summary {
        handle_export_summary(&config)?;
    } else {
        handle_crawl(config, &config_hash).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("drivelog=info,warn"),
            1 => EnvFilter::new("drivelog=debug,info"),
            2 => EnvFilter::new("drivelog=trace,debug"),
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

/// Command-line values win over the config file
fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(username) = &cli.username {
        config.start.username = Some(username.clone());
    }
    if let Some(start_url) = &cli.start_url {
        config.start.start_url = Some(start_url.clone());
    }
    if let Some(database) = &cli.database {
        config.output.database_path = database.clone();
    }
}

/// The database an earlier run wrote to
///
/// A `{timestamp}` template names a new file per run, so it cannot be
/// read back without an explicit path.
fn existing_database(config: &Config) -> anyhow::Result<PathBuf> {
    if config.output.database_path.contains("{timestamp}") {
        bail!(
            "database path {} is a per-run template; pass --database with the export to read",
            config.output.database_path
        );
    }

    let path = PathBuf::from(&config.output.database_path);
    if !path.exists() {
        bail!("database {} does not exist", path.display());
    }
    Ok(path)
}

/// Handles the --dry-run mode: validates config and shows where the crawl would start
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    let seed = seed(config)?;

    println!("=== Drivelog Dry Run ===\n");

    println!("Crawler Configuration:");
    println!(
        "  Max concurrent pages: {}",
        config.crawler.max_concurrent_pages_open
    );
    println!(
        "  Minimum time on page: {}ms",
        config.crawler.minimum_time_on_page
    );
    println!(
        "  Retries: {} ({}ms apart)",
        config.crawler.max_retries, config.crawler.retry_delay
    );
    match config.crawler.max_requests {
        0 => println!("  Max requests: unlimited"),
        n => println!("  Max requests: {}", n),
    }

    println!("\nUser Agent: {}", config.user_agent.header_value());

    println!("\nSite:");
    println!("  Base URL: {}", config.site.base_url);
    println!("  Profile path: {}", config.site.profile_path);

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);
    if let Some(summary_path) = &config.output.summary_path {
        println!("  Summary: {}", summary_path);
    }

    println!("\n✓ Configuration is valid");
    println!("✓ Would start at {} ({})", seed.item.url, seed.item.kind);
    match &seed.subject {
        Some(subject) => println!("✓ Photo posts must be authored by {}", subject),
        None => println!("✓ No subject; photo post authorship is not checked"),
    }

    Ok(())
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    let path = existing_database(config)?;
    println!("Database: {}\n", path.display());

    let storage = open_storage(&path)?;
    let stats = load_statistics(&storage)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the --export-summary mode: generates markdown summary
fn handle_export_summary(config: &Config) -> anyhow::Result<()> {
    let path = existing_database(config)?;
    let summary_path = config
        .output
        .summary_path
        .clone()
        .unwrap_or_else(|| "./summary.md".to_string());

    println!("=== Exporting Crawl Summary ===\n");
    println!("Database: {}", path.display());
    println!("Output: {}", summary_path);
    println!();

    let storage = open_storage(&path)?;

    tracing::info!("Loading crawl data from database...");
    let summary = generate_summary(&storage)?;

    tracing::info!("Generating markdown summary...");
    generate_markdown_summary(&summary, Path::new(&summary_path))?;

    println!("✓ Summary exported to: {}", summary_path);

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, config_hash: &str) -> anyhow::Result<()> {
    match run_crawl(config, config_hash).await {
        Ok(report) => {
            tracing::info!(
                "Crawl finished ({}): {} records exported",
                report
                    .status
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "unknown".to_string()),
                report.records_emitted
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
