//! Idempotent fact loading
//!
//! `fact_production` carries UNIQUE (source_system, source_event_id). The
//! insert is attempted unconditionally and a uniqueness violation is the
//! duplicate signal; there is no read-before-write and no in-process lock.

use sqlx::{Connection, SqliteConnection};
use tracing::{error, warn};

use crate::models::CanonicalProductionEvent;

/// Insert the event unless its (source_system, source_event_id) already exists
///
/// Runs in its own transaction on `conn`. Returns `true` when committed,
/// `false` when another writer already stored the event (rolled back).
/// Any other failure rolls back and is returned.
pub async fn insert_if_new(
    conn: &mut SqliteConnection,
    event: &CanonicalProductionEvent,
) -> Result<bool, sqlx::Error> {
    let mut tx = conn.begin().await?;

    let result = sqlx::query(
        r#"
        INSERT INTO fact_production
            (event_ts, plant_code, product_key, produced_qty_lb, scrap_qty_lb,
             source_system, source_event_id)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(event.event_ts)
    .bind(&event.plant_code)
    .bind(event.product_key)
    .bind(event.produced_qty_lb)
    .bind(event.scrap_qty_lb)
    .bind(&event.source_system)
    .bind(&event.source_event_id)
    .execute(&mut *tx)
    .await;

    match result {
        Ok(_) => {
            tx.commit().await?;
            Ok(true)
        }
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
            tx.rollback().await?;
            warn!(
                "Duplicate production event {}/{}",
                event.source_system, event.source_event_id
            );
            Ok(false)
        }
        Err(e) => {
            error!(
                "Failed to insert production event {}/{}: {}",
                event.source_system, event.source_event_id, e
            );
            if let Err(rollback_err) = tx.rollback().await {
                error!("Rollback failed: {}", rollback_err);
            }
            Err(e)
        }
    }
}
