//! Database initialization
//!
//! Creates the warehouse schema idempotently on every start:
//! dimensions, the source-to-canonical product mapping, the production and
//! pricing facts, the file ingestion state table and the per-protein views.

use crate::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Busy timeout applied to every pooled connection
const BUSY_TIMEOUT: Duration = Duration::from_millis(5000);

/// Protein views as (view name, dim_product.protein_type)
pub const PROTEIN_VIEWS: [(&str, &str); 3] = [
    ("vw_pork_production", "PORK"),
    ("vw_beef_production", "BEEF"),
    ("vw_poultry_production", "POULTRY"),
];

/// Open (creating if needed) the database file and ensure the schema exists
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(BUSY_TIMEOUT);

    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect_with(options)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    create_schema(&pool).await?;

    Ok(pool)
}

/// In-memory database with the full schema
///
/// Single connection so every query sees the same memory database.
pub async fn init_memory_database() -> Result<SqlitePool> {
    let options = SqliteConnectOptions::new()
        .in_memory(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;

    create_schema(&pool).await?;

    Ok(pool)
}

/// Create all tables, indexes and views (idempotent)
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    create_dim_product_table(pool).await?;
    create_dim_plant_table(pool).await?;
    create_product_mapping_table(pool).await?;
    create_fact_production_table(pool).await?;
    create_fact_price_by_plant_table(pool).await?;
    create_file_ingestion_state_table(pool).await?;
    ensure_protein_views(pool).await?;
    Ok(())
}

async fn create_dim_product_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS dim_product (
            product_key INTEGER PRIMARY KEY AUTOINCREMENT,
            canonical_sku TEXT NOT NULL UNIQUE,
            product_name TEXT NOT NULL,
            protein_type TEXT NOT NULL,
            cut_type TEXT,
            uom TEXT NOT NULL DEFAULT 'LB',
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_dim_plant_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS dim_plant (
            plant_code TEXT PRIMARY KEY,
            plant_name TEXT NOT NULL,
            state TEXT,
            region TEXT,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS ix_dim_plant_region ON dim_plant(region)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS ix_dim_plant_state ON dim_plant(state)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Source item to canonical product mapping
///
/// Historical versions of one (source_system, source_item_id, plant_code)
/// triple differ by effective_start_dt; only `is_current = 1` rows resolve.
async fn create_product_mapping_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS map_product_source_to_canonical (
            map_key INTEGER PRIMARY KEY AUTOINCREMENT,
            source_system TEXT NOT NULL,
            source_item_id TEXT NOT NULL,
            source_item_desc TEXT,
            product_key INTEGER NOT NULL REFERENCES dim_product(product_key),
            source_protein_type TEXT,
            source_uom TEXT,
            pack_size TEXT,
            plant_code TEXT,
            match_confidence REAL NOT NULL DEFAULT 1.00,
            mapping_method TEXT NOT NULL DEFAULT 'MANUAL',
            effective_start_dt DATE NOT NULL,
            effective_end_dt DATE,
            is_current INTEGER NOT NULL DEFAULT 1,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            CONSTRAINT uq_map_source_plant_start
                UNIQUE (source_system, source_item_id, plant_code, effective_start_dt)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS ix_map_product_key ON map_product_source_to_canonical(product_key)",
    )
    .execute(pool)
    .await?;
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS ix_map_source_lookup \
         ON map_product_source_to_canonical(source_system, source_item_id, is_current)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Production fact table
///
/// `uq_fact_src_event` is the only idempotency mechanism for ingestion.
async fn create_fact_production_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS fact_production (
            production_key INTEGER PRIMARY KEY AUTOINCREMENT,
            event_ts TIMESTAMP NOT NULL,
            plant_code TEXT,
            product_key INTEGER NOT NULL REFERENCES dim_product(product_key),
            produced_qty_lb REAL NOT NULL,
            scrap_qty_lb REAL NOT NULL DEFAULT 0,
            source_system TEXT NOT NULL,
            source_event_id TEXT NOT NULL,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            CONSTRAINT uq_fact_src_event UNIQUE (source_system, source_event_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS ix_fact_event_ts ON fact_production(event_ts)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS ix_fact_plant ON fact_production(plant_code)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_fact_price_by_plant_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS fact_price_by_plant (
            price_key INTEGER PRIMARY KEY AUTOINCREMENT,
            product_key INTEGER NOT NULL REFERENCES dim_product(product_key),
            plant_code TEXT NOT NULL REFERENCES dim_plant(plant_code),
            price_per_lb REAL NOT NULL,
            currency TEXT NOT NULL DEFAULT 'USD',
            effective_start_dt DATE NOT NULL,
            effective_end_dt DATE,
            is_current INTEGER NOT NULL DEFAULT 1,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            CONSTRAINT uq_price_prod_plant_start
                UNIQUE (product_key, plant_code, effective_start_dt)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS ix_price_plant_current ON fact_price_by_plant(plant_code, is_current)",
    )
    .execute(pool)
    .await?;
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS ix_price_product_current ON fact_price_by_plant(product_key, is_current)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// One row per processed file attempt, newest row wins
async fn create_file_ingestion_state_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS etl_file_ingestion_state (
            ingestion_key INTEGER PRIMARY KEY AUTOINCREMENT,
            source_system TEXT NOT NULL,
            source_location TEXT NOT NULL,
            file_id TEXT NOT NULL,
            file_name TEXT NOT NULL,
            file_hash TEXT,
            status TEXT NOT NULL,
            rows_loaded INTEGER NOT NULL DEFAULT 0,
            error_message TEXT,
            ingested_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS ix_etl_file_lookup \
         ON etl_file_ingestion_state(source_system, source_location, file_id)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Recreate the per-protein production views
///
/// SQLite has no CREATE OR REPLACE VIEW, so each view is dropped first.
pub async fn ensure_protein_views(pool: &SqlitePool) -> Result<()> {
    let mut tx = pool.begin().await?;

    for (view_name, protein) in PROTEIN_VIEWS {
        sqlx::query(&format!("DROP VIEW IF EXISTS {}", view_name))
            .execute(&mut *tx)
            .await?;
        sqlx::query(&protein_view_sql(view_name, protein))
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    Ok(())
}

fn protein_view_sql(view_name: &str, protein: &str) -> String {
    format!(
        r#"
        CREATE VIEW {view_name} AS
        SELECT
            fp.event_ts,
            fp.plant_code,
            fp.produced_qty_lb,
            fp.scrap_qty_lb,
            fp.source_system,
            fp.source_event_id,
            fp.product_key,
            dp.canonical_sku,
            dp.product_name,
            dp.protein_type,
            dp.cut_type,
            dp.uom AS product_uom
        FROM fact_production fp
        JOIN dim_product dp ON fp.product_key = dp.product_key
        WHERE dp.protein_type = '{protein}'
        "#
    )
}
