//! Production ingest endpoint

use axum::{extract::State, Json};
use tracing::warn;

use crate::error::{ApiError, ApiResult};
use crate::models::IngestResponse;
use crate::plugins::Payload;
use crate::AppState;

/// POST /ingest/production
///
/// Body is a JSON object in the source system's own field layout, with
/// `source_system` selecting the plugin. Duplicates return 200 with
/// status "duplicate".
pub async fn ingest_production(
    State(state): State<AppState>,
    payload: Result<Json<Payload>, axum::extract::rejection::JsonRejection>,
) -> ApiResult<Json<IngestResponse>> {
    let Json(payload) = payload?;

    let response = state
        .orchestrator
        .ingest_production(&state.db, &payload)
        .await
        .map_err(|e| {
            warn!("Ingest rejected: {}", e);
            ApiError::from(e)
        })?;

    Ok(Json(response))
}
