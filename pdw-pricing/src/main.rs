//! pdw-pricing - load plant pricing files
//!
//! Runs a single pass over the pricing drop directory and exits; schedule
//! it with cron. Prints the run summary as JSON on stdout.

use anyhow::{bail, Result};
use clap::Parser;
use pdw_common::config::{resolve_database_path, TomlConfig, DATABASE_PATH_ENV};
use pdw_common::db::init_database;
use pdw_pricing::{run_once, PricingSource};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "pdw-pricing")]
#[command(about = "Load plant pricing CSV files into the protein data warehouse")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Path to the SQLite database (overrides PDW_DATABASE_PATH and config file)
    #[arg(short, long)]
    database: Option<PathBuf>,

    /// Directory scanned for pricing files
    #[arg(long, env = "PDW_PRICING_DIR")]
    source_dir: Option<PathBuf>,

    /// Required file name prefix
    #[arg(long, env = "PDW_PRICING_PREFIX")]
    prefix: Option<String>,

    /// Required file name suffix
    #[arg(long, env = "PDW_PRICING_SUFFIX")]
    suffix: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = TomlConfig::load(args.config.as_deref())?;

    // RUST_LOG takes precedence over the config file level
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    info!(
        "Starting PDW Pricing (pdw-pricing) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let Some(dir) = args.source_dir.or_else(|| config.pricing.source_dir.clone()) else {
        bail!("No pricing source directory (use --source-dir, PDW_PRICING_DIR or [pricing] source_dir)");
    };

    let source = PricingSource {
        dir,
        prefix: args.prefix.unwrap_or_else(|| config.pricing.prefix.clone()),
        suffix: args.suffix.unwrap_or_else(|| config.pricing.suffix.clone()),
    };

    let db_path = resolve_database_path(args.database.as_deref(), DATABASE_PATH_ENV, &config);
    info!("Database path: {}", db_path.display());
    let pool = init_database(&db_path).await?;

    let summary = run_once(&pool, &source).await?;
    info!(
        "Pricing run complete: {} found, {} processed, {} skipped, {} rows, {} failed",
        summary.files_found,
        summary.files_processed,
        summary.files_skipped,
        summary.rows_loaded,
        summary.failures.len()
    );
    println!("{}", serde_json::to_string(&summary)?);

    pool.close().await;
    Ok(())
}
