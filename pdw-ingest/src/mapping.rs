//! Product mapping resolution
//!
//! Source item ids resolve to canonical product keys through
//! `map_product_source_to_canonical`. A plant-scoped mapping beats the
//! plant-agnostic one (plant_code NULL); only current rows are consulted.

use sqlx::SqliteConnection;
use thiserror::Error;
use tracing::debug;

use crate::error::IngestError;

/// No current mapping for the lookup triple
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "No current product mapping for source_system={source_system:?}, \
     source_item_id={source_item_id:?}, plant_code={plant_code:?}"
)]
pub struct MappingNotFoundError {
    pub source_system: String,
    pub source_item_id: String,
    pub plant_code: Option<String>,
}

/// Resolve the canonical product key
///
/// Exact (plant-scoped) tier runs only when `plant_code` is given; a miss
/// there, or no plant at all, falls back to the plant_code NULL tier.
/// Within a tier the latest effective_start_dt wins, then the highest map_key.
pub async fn resolve_product_key(
    conn: &mut SqliteConnection,
    source_system: &str,
    source_item_id: &str,
    plant_code: Option<&str>,
) -> Result<i64, IngestError> {
    if let Some(plant) = plant_code {
        let exact: Option<i64> = sqlx::query_scalar(
            r#"
            SELECT product_key
            FROM map_product_source_to_canonical
            WHERE source_system = ?
              AND source_item_id = ?
              AND plant_code = ?
              AND is_current = 1
            ORDER BY effective_start_dt DESC, map_key DESC
            LIMIT 1
            "#,
        )
        .bind(source_system)
        .bind(source_item_id)
        .bind(plant)
        .fetch_optional(&mut *conn)
        .await?;

        if let Some(product_key) = exact {
            debug!(
                "Mapped {}/{} at plant {} to product_key {}",
                source_system, source_item_id, plant, product_key
            );
            return Ok(product_key);
        }
    }

    let fallback: Option<i64> = sqlx::query_scalar(
        r#"
        SELECT product_key
        FROM map_product_source_to_canonical
        WHERE source_system = ?
          AND source_item_id = ?
          AND plant_code IS NULL
          AND is_current = 1
        ORDER BY effective_start_dt DESC, map_key DESC
        LIMIT 1
        "#,
    )
    .bind(source_system)
    .bind(source_item_id)
    .fetch_optional(&mut *conn)
    .await?;

    match fallback {
        Some(product_key) => {
            debug!(
                "Mapped {}/{} via plant-agnostic mapping to product_key {}",
                source_system, source_item_id, product_key
            );
            Ok(product_key)
        }
        None => Err(MappingNotFoundError {
            source_system: source_system.to_string(),
            source_item_id: source_item_id.to_string(),
            plant_code: plant_code.map(str::to_string),
        }
        .into()),
    }
}
