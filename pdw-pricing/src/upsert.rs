//! Pricing upsert into `fact_price_by_plant`
//!
//! Runs on the caller's transaction. Unknown plants are created with a
//! placeholder name; unknown products fail the whole batch.

use sqlx::SqliteConnection;
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

use crate::error::{PricingError, Result};
use crate::parse::PricingRow;

/// Upsert rows keyed by (product, plant, effective_start_dt)
///
/// A current row retires every other current price for its product and
/// plant. Returns the number of newly inserted rows; updates are not counted.
pub async fn upsert_pricing_rows(conn: &mut SqliteConnection, rows: &[PricingRow]) -> Result<u64> {
    if rows.is_empty() {
        return Ok(0);
    }

    ensure_plants(conn, rows.iter().map(|r| r.plant_code.as_str())).await?;
    let product_keys = resolve_products(conn, rows.iter().map(|r| r.canonical_sku.as_str())).await?;

    let mut inserted = 0;
    for row in rows {
        // Every SKU was resolved above
        let Some(&product_key) = product_keys.get(&row.canonical_sku) else {
            return Err(PricingError::UnknownSkus(vec![row.canonical_sku.clone()]));
        };

        if row.is_current {
            sqlx::query(
                "UPDATE fact_price_by_plant SET is_current = 0
                 WHERE product_key = ? AND plant_code = ? AND is_current = 1",
            )
            .bind(product_key)
            .bind(&row.plant_code)
            .execute(&mut *conn)
            .await?;
        }

        let updated = sqlx::query(
            r#"
            UPDATE fact_price_by_plant
            SET price_per_lb = ?, currency = ?, effective_end_dt = ?, is_current = ?
            WHERE product_key = ? AND plant_code = ? AND effective_start_dt = ?
            "#,
        )
        .bind(row.price_per_lb)
        .bind(&row.currency)
        .bind(row.effective_end_dt)
        .bind(row.is_current)
        .bind(product_key)
        .bind(&row.plant_code)
        .bind(row.effective_start_dt)
        .execute(&mut *conn)
        .await?
        .rows_affected();

        if updated == 0 {
            sqlx::query(
                r#"
                INSERT INTO fact_price_by_plant
                    (product_key, plant_code, price_per_lb, currency,
                     effective_start_dt, effective_end_dt, is_current)
                VALUES (?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(product_key)
            .bind(&row.plant_code)
            .bind(row.price_per_lb)
            .bind(&row.currency)
            .bind(row.effective_start_dt)
            .bind(row.effective_end_dt)
            .bind(row.is_current)
            .execute(&mut *conn)
            .await?;
            inserted += 1;
        }
    }

    debug!("Upserted {} pricing rows ({} new)", rows.len(), inserted);
    Ok(inserted)
}

async fn ensure_plants<'a>(
    conn: &mut SqliteConnection,
    plant_codes: impl Iterator<Item = &'a str>,
) -> Result<()> {
    let codes: BTreeSet<&str> = plant_codes.collect();

    for code in codes {
        let created = sqlx::query(
            "INSERT INTO dim_plant (plant_code, plant_name, is_active)
             VALUES (?, ?, 1)
             ON CONFLICT(plant_code) DO NOTHING",
        )
        .bind(code)
        .bind(format!("Plant {}", code))
        .execute(&mut *conn)
        .await?
        .rows_affected();

        if created > 0 {
            debug!("Created plant {} from pricing file", code);
        }
    }

    Ok(())
}

/// canonical_sku → product_key; any unknown SKU is an error naming all of them
async fn resolve_products<'a>(
    conn: &mut SqliteConnection,
    skus: impl Iterator<Item = &'a str>,
) -> Result<HashMap<String, i64>> {
    let skus: BTreeSet<&str> = skus.collect();
    let mut keys = HashMap::new();
    let mut missing = Vec::new();

    for sku in skus {
        let key: Option<i64> =
            sqlx::query_scalar("SELECT product_key FROM dim_product WHERE canonical_sku = ?")
                .bind(sku)
                .fetch_optional(&mut *conn)
                .await?;
        match key {
            Some(key) => {
                keys.insert(sku.to_string(), key);
            }
            None => missing.push(sku.to_string()),
        }
    }

    if !missing.is_empty() {
        return Err(PricingError::UnknownSkus(missing));
    }
    Ok(keys)
}
