//! Admin endpoints

use axum::{extract::State, Json};
use pdw_common::db::{seed, SeedCounts};
use serde::Serialize;

use crate::error::ApiResult;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct SeedResponse {
    pub status: String,
    pub inserted: SeedCounts,
}

/// POST /admin/seed
pub async fn seed_master_data(State(state): State<AppState>) -> ApiResult<Json<SeedResponse>> {
    let inserted = seed(&state.db).await?;

    Ok(Json(SeedResponse {
        status: "ok".to_string(),
        inserted,
    }))
}
