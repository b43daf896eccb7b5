//! pdw-seed - load demo master data
//!
//! Creates the demo products, plants and source mappings if missing and
//! prints how many rows were created.

use anyhow::Result;
use clap::Parser;
use pdw_common::config::{resolve_database_path, TomlConfig, DATABASE_PATH_ENV};
use pdw_common::db::{init_database, seed};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "pdw-seed")]
#[command(about = "Seed protein data warehouse master data")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Path to the SQLite database (overrides PDW_DATABASE_PATH and config file)
    #[arg(short, long)]
    database: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = TomlConfig::load(args.config.as_deref())?;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    info!(
        "Starting PDW Seed (pdw-seed) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let db_path = resolve_database_path(args.database.as_deref(), DATABASE_PATH_ENV, &config);
    let pool = init_database(&db_path).await?;

    let counts = seed(&pool).await?;
    println!("{}", serde_json::to_string(&counts)?);

    pool.close().await;
    Ok(())
}
