//! Master-data seeding
//!
//! Demo products, plants and source mappings for the three upstream systems.
//! Re-running is harmless; counts only include rows created by this call.

use crate::Result;
use chrono::Local;
use serde::Serialize;
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::info;

/// Rows created by one [`seed`] call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeedCounts {
    pub products: u64,
    pub plants: u64,
    pub mappings: u64,
}

struct SeedProduct {
    canonical_sku: &'static str,
    product_name: &'static str,
    protein_type: &'static str,
    cut_type: &'static str,
}

struct SeedPlant {
    plant_code: &'static str,
    plant_name: &'static str,
    state: &'static str,
    region: &'static str,
}

struct SeedMapping {
    source_system: &'static str,
    source_item_id: &'static str,
    plant_code: Option<&'static str>,
    canonical_sku: &'static str,
    source_item_desc: &'static str,
}

const PRODUCTS: [SeedProduct; 3] = [
    SeedProduct {
        canonical_sku: "PORK-LOIN-001",
        product_name: "Pork Loin Boneless",
        protein_type: "PORK",
        cut_type: "LOIN",
    },
    SeedProduct {
        canonical_sku: "BEEF-CHUCK-001",
        product_name: "Beef Chuck Roast",
        protein_type: "BEEF",
        cut_type: "CHUCK",
    },
    SeedProduct {
        canonical_sku: "POULTRY-BREAST-001",
        product_name: "Chicken Breast Boneless",
        protein_type: "POULTRY",
        cut_type: "BREAST",
    },
];

const PLANTS: [SeedPlant; 3] = [
    SeedPlant {
        plant_code: "VA01",
        plant_name: "Virginia Processing",
        state: "VA",
        region: "SOUTHEAST",
    },
    SeedPlant {
        plant_code: "NC02",
        plant_name: "North Carolina Processing",
        state: "NC",
        region: "SOUTHEAST",
    },
    SeedPlant {
        plant_code: "SC03",
        plant_name: "South Carolina Processing",
        state: "SC",
        region: "SOUTHEAST",
    },
];

const MAPPINGS: [SeedMapping; 3] = [
    SeedMapping {
        source_system: "PORK_ERP",
        source_item_id: "ITM-100221",
        plant_code: Some("VA01"),
        canonical_sku: "PORK-LOIN-001",
        source_item_desc: "LOIN BNLS",
    },
    SeedMapping {
        source_system: "BEEF_WMS",
        source_item_id: "SKU-88910",
        plant_code: Some("NC02"),
        canonical_sku: "BEEF-CHUCK-001",
        source_item_desc: "CHUCK ROAST",
    },
    SeedMapping {
        source_system: "POULTRY_MES",
        source_item_id: "MAT-CHKBRS-77",
        plant_code: Some("SC03"),
        canonical_sku: "POULTRY-BREAST-001",
        source_item_desc: "CHKN BRST BNLS",
    },
];

/// Seed demo master data in a single transaction
pub async fn seed(pool: &SqlitePool) -> Result<SeedCounts> {
    let mut tx = pool.begin().await?;
    let mut counts = SeedCounts::default();

    for product in &PRODUCTS {
        counts.products += insert_product(&mut tx, product).await?;
    }

    for plant in &PLANTS {
        counts.plants += insert_plant(&mut tx, plant).await?;
    }

    for mapping in &MAPPINGS {
        counts.mappings += insert_mapping(&mut tx, mapping).await?;
    }

    tx.commit().await?;

    info!(
        "Seed complete: {} products, {} plants, {} mappings created",
        counts.products, counts.plants, counts.mappings
    );

    Ok(counts)
}

async fn insert_product(tx: &mut Transaction<'_, Sqlite>, product: &SeedProduct) -> Result<u64> {
    let result = sqlx::query(
        r#"
        INSERT INTO dim_product (canonical_sku, product_name, protein_type, cut_type, uom, is_active)
        VALUES (?, ?, ?, ?, 'LB', 1)
        ON CONFLICT(canonical_sku) DO NOTHING
        "#,
    )
    .bind(product.canonical_sku)
    .bind(product.product_name)
    .bind(product.protein_type)
    .bind(product.cut_type)
    .execute(&mut **tx)
    .await?;

    Ok(result.rows_affected())
}

async fn insert_plant(tx: &mut Transaction<'_, Sqlite>, plant: &SeedPlant) -> Result<u64> {
    let result = sqlx::query(
        r#"
        INSERT INTO dim_plant (plant_code, plant_name, state, region, is_active)
        VALUES (?, ?, ?, ?, 1)
        ON CONFLICT(plant_code) DO NOTHING
        "#,
    )
    .bind(plant.plant_code)
    .bind(plant.plant_name)
    .bind(plant.state)
    .bind(plant.region)
    .execute(&mut **tx)
    .await?;

    Ok(result.rows_affected())
}

/// Insert a current mapping unless one already exists for the triple
async fn insert_mapping(tx: &mut Transaction<'_, Sqlite>, mapping: &SeedMapping) -> Result<u64> {
    let result = sqlx::query(
        r#"
        INSERT INTO map_product_source_to_canonical
            (source_system, source_item_id, source_item_desc, product_key, plant_code,
             effective_start_dt, is_current)
        SELECT ?, ?, ?, dp.product_key, ?, ?, 1
        FROM dim_product dp
        WHERE dp.canonical_sku = ?
          AND NOT EXISTS (
              SELECT 1 FROM map_product_source_to_canonical m
              WHERE m.source_system = ?
                AND m.source_item_id = ?
                AND m.plant_code IS ?
          )
        "#,
    )
    .bind(mapping.source_system)
    .bind(mapping.source_item_id)
    .bind(mapping.source_item_desc)
    .bind(mapping.plant_code)
    .bind(Local::now().date_naive())
    .bind(mapping.canonical_sku)
    .bind(mapping.source_system)
    .bind(mapping.source_item_id)
    .bind(mapping.plant_code)
    .execute(&mut **tx)
    .await?;

    Ok(result.rows_affected())
}
