//! Database row models

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// `dim_product` row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct DimProduct {
    pub product_key: i64,
    pub canonical_sku: String,
    pub product_name: String,
    pub protein_type: String,
    pub cut_type: Option<String>,
    pub uom: String,
    pub is_active: bool,
}

/// `dim_plant` row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct DimPlant {
    pub plant_code: String,
    pub plant_name: String,
    pub state: Option<String>,
    pub region: Option<String>,
    pub is_active: bool,
}

/// `map_product_source_to_canonical` row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProductMapping {
    pub map_key: i64,
    pub source_system: String,
    pub source_item_id: String,
    pub source_item_desc: Option<String>,
    pub product_key: i64,
    /// NULL means the mapping applies to every plant
    pub plant_code: Option<String>,
    pub effective_start_dt: NaiveDate,
    pub effective_end_dt: Option<NaiveDate>,
    pub is_current: bool,
}

/// `fact_production` row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct FactProduction {
    pub production_key: i64,
    pub event_ts: NaiveDateTime,
    pub plant_code: Option<String>,
    pub product_key: i64,
    pub produced_qty_lb: f64,
    pub scrap_qty_lb: f64,
    pub source_system: String,
    pub source_event_id: String,
}

/// `fact_price_by_plant` row joined with its product and plant
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PriceByPlant {
    pub price_key: i64,
    pub product_key: i64,
    pub canonical_sku: String,
    pub product_name: String,
    pub protein_type: String,
    pub plant_code: String,
    pub plant_name: String,
    pub price_per_lb: f64,
    pub currency: String,
    pub effective_start_dt: NaiveDate,
    pub effective_end_dt: Option<NaiveDate>,
    pub is_current: bool,
}
