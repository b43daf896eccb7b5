//! Read-only dimension and pricing endpoints

use axum::{
    extract::{Query, State},
    Json,
};
use pdw_common::db::{self, DimPlant, DimProduct, PlantFilter, PriceByPlant, PriceFilter, ProductFilter};

use crate::error::ApiResult;
use crate::AppState;

/// GET /dim/plants?is_active=&region=&state=
pub async fn list_plants(
    State(state): State<AppState>,
    Query(filter): Query<PlantFilter>,
) -> ApiResult<Json<Vec<DimPlant>>> {
    Ok(Json(db::list_plants(&state.db, &filter).await?))
}

/// GET /dim/products?protein_type=&is_active=
pub async fn list_products(
    State(state): State<AppState>,
    Query(filter): Query<ProductFilter>,
) -> ApiResult<Json<Vec<DimProduct>>> {
    Ok(Json(db::list_products(&state.db, &filter).await?))
}

/// GET /fact/pricing?protein_type=&plant_code=&is_current=
pub async fn list_prices(
    State(state): State<AppState>,
    Query(filter): Query<PriceFilter>,
) -> ApiResult<Json<Vec<PriceByPlant>>> {
    Ok(Json(db::list_prices(&state.db, &filter).await?))
}
