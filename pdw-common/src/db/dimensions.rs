//! Read queries over dimensions and the pricing fact
//!
//! Every filter field is optional; `None` leaves that column unconstrained.

use crate::db::models::{DimPlant, DimProduct, PriceByPlant};
use crate::Result;
use serde::Deserialize;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

/// Filter for [`list_plants`]
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlantFilter {
    pub is_active: Option<bool>,
    pub region: Option<String>,
    pub state: Option<String>,
}

/// Filter for [`list_products`]
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductFilter {
    pub protein_type: Option<String>,
    pub is_active: Option<bool>,
}

/// Filter for [`list_prices`]
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PriceFilter {
    pub protein_type: Option<String>,
    pub plant_code: Option<String>,
    pub is_current: Option<bool>,
}

/// Plants ordered by plant_code
pub async fn list_plants(pool: &SqlitePool, filter: &PlantFilter) -> Result<Vec<DimPlant>> {
    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
        "SELECT plant_code, plant_name, state, region, is_active FROM dim_plant WHERE 1 = 1",
    );
    if let Some(is_active) = filter.is_active {
        qb.push(" AND is_active = ").push_bind(is_active);
    }
    if let Some(region) = &filter.region {
        qb.push(" AND region = ").push_bind(region.clone());
    }
    if let Some(state) = &filter.state {
        qb.push(" AND state = ").push_bind(state.clone());
    }
    qb.push(" ORDER BY plant_code ASC");

    let plants = qb.build_query_as::<DimPlant>().fetch_all(pool).await?;
    Ok(plants)
}

/// Products ordered by canonical_sku
pub async fn list_products(pool: &SqlitePool, filter: &ProductFilter) -> Result<Vec<DimProduct>> {
    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
        "SELECT product_key, canonical_sku, product_name, protein_type, cut_type, uom, is_active \
         FROM dim_product WHERE 1 = 1",
    );
    if let Some(protein_type) = &filter.protein_type {
        qb.push(" AND protein_type = ")
            .push_bind(protein_type.to_uppercase());
    }
    if let Some(is_active) = filter.is_active {
        qb.push(" AND is_active = ").push_bind(is_active);
    }
    qb.push(" ORDER BY canonical_sku ASC");

    let products = qb.build_query_as::<DimProduct>().fetch_all(pool).await?;
    Ok(products)
}

/// Plant prices joined with product and plant names
pub async fn list_prices(pool: &SqlitePool, filter: &PriceFilter) -> Result<Vec<PriceByPlant>> {
    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
        r#"
        SELECT
            fp.price_key,
            fp.product_key,
            dp.canonical_sku,
            dp.product_name,
            dp.protein_type,
            fp.plant_code,
            pl.plant_name,
            fp.price_per_lb,
            fp.currency,
            fp.effective_start_dt,
            fp.effective_end_dt,
            fp.is_current
        FROM fact_price_by_plant fp
        JOIN dim_product dp ON fp.product_key = dp.product_key
        JOIN dim_plant pl ON fp.plant_code = pl.plant_code
        WHERE 1 = 1
        "#,
    );
    if let Some(protein_type) = &filter.protein_type {
        qb.push(" AND dp.protein_type = ")
            .push_bind(protein_type.to_uppercase());
    }
    if let Some(plant_code) = &filter.plant_code {
        qb.push(" AND fp.plant_code = ").push_bind(plant_code.clone());
    }
    if let Some(is_current) = filter.is_current {
        qb.push(" AND fp.is_current = ").push_bind(is_current);
    }
    qb.push(" ORDER BY fp.plant_code ASC, dp.canonical_sku ASC, fp.effective_start_dt ASC");

    let prices = qb.build_query_as::<PriceByPlant>().fetch_all(pool).await?;
    Ok(prices)
}
