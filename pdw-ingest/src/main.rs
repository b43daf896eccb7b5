//! pdw-ingest - production event ingestion service
//!
//! Accepts plant production events over HTTP from the pork ERP, beef WMS
//! and poultry MES systems and loads them into the warehouse.

use anyhow::Result;
use clap::Parser;
use pdw_common::config::{resolve_database_path, TomlConfig, DATABASE_PATH_ENV};
use pdw_common::db::init_database;
use pdw_ingest::{build_router, AppState, PluginRegistry};
use std::path::PathBuf;
use tracing::{error, info};

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "pdw-ingest")]
#[command(about = "Protein data warehouse production ingest service")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Path to the SQLite database (overrides PDW_DATABASE_PATH and config file)
    #[arg(short, long)]
    database: Option<PathBuf>,

    /// Bind address
    #[arg(long, env = "PDW_HOST")]
    host: Option<String>,

    /// HTTP server port
    #[arg(short, long, env = "PDW_PORT")]
    port: Option<u16>,

    /// Token required by admin endpoints
    #[arg(long, env = "ADMIN_TOKEN", hide_env_values = true)]
    admin_token: Option<String>,
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
        .with_target(true)
        .init();

    info!(
        "Starting PDW Ingest (pdw-ingest) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let db_path = resolve_database_path(args.database.as_deref(), DATABASE_PATH_ENV, &config);
    info!("Database path: {}", db_path.display());

    let pool = match init_database(&db_path).await {
        Ok(pool) => pool,
        Err(e) => {
            error!("Failed to initialize database: {}", e);
            return Err(e.into());
        }
    };

    let registry = PluginRegistry::with_builtin_plugins();
    info!("Registered source plugins: {}", registry.keys().join(", "));

    let admin_token = args.admin_token.or(config.admin_token);
    if admin_token.is_none() {
        info!("No admin token configured; admin endpoints disabled");
    }

    let state = AppState::new(pool, registry, admin_token);
    let app = build_router(state);

    let host = args.host.unwrap_or(config.host);
    let port = args.port.unwrap_or(config.port);
    let addr = format!("{}:{}", host, port);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("pdw-ingest listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("pdw-ingest stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
