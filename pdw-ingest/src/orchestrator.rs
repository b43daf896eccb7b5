//! End-to-end production ingest
//!
//! payload → plugin → intermediate event → product key → pounds → fact row.
//! Mapping lookup and the fact insert share one pooled connection; the
//! insert commits or rolls back as a unit.

use serde_json::Value;
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::IngestError;
use crate::loader::insert_if_new;
use crate::mapping::resolve_product_key;
use crate::models::{CanonicalProductionEvent, IngestResponse, IngestStatus, RawProductionEvent};
use crate::plugins::{Payload, PluginRegistry};
use crate::units;

/// Composes plugin lookup, mapping, unit conversion and loading
#[derive(Debug, Clone)]
pub struct IngestOrchestrator {
    registry: Arc<PluginRegistry>,
}

impl IngestOrchestrator {
    pub fn new(registry: Arc<PluginRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &PluginRegistry {
        &self.registry
    }

    /// Ingest one production event
    ///
    /// # Errors
    /// - [`IngestError::Validation`] for a missing source_system or a payload
    ///   the plugin cannot shape into an event
    /// - [`IngestError::PluginNotFound`] for an unregistered source_system
    /// - [`IngestError::MappingNotFound`] when no current mapping matches
    /// - [`IngestError::Normalization`] for an unsupported unit
    /// - [`IngestError::Database`] for storage failures
    ///
    /// A duplicate event is not an error; it yields [`IngestStatus::Duplicate`].
    pub async fn ingest_production(
        &self,
        pool: &SqlitePool,
        payload: &Payload,
    ) -> Result<IngestResponse, IngestError> {
        let source_system = match payload.get("source_system") {
            Some(Value::String(s)) if !s.trim().is_empty() => s.as_str(),
            _ => {
                return Err(IngestError::Validation(
                    "Missing required field: source_system".to_string(),
                ))
            }
        };

        let plugin = self.registry.resolve(source_system)?;
        let shape = plugin.transform(payload)?;
        let raw = RawProductionEvent::from_shape(shape)?;

        debug!(
            "Transformed {} event {} (item {}, plant {:?})",
            raw.source_system, raw.source_event_id, raw.source_item_id, raw.plant_code
        );

        let mut conn = pool.acquire().await?;

        let product_key = resolve_product_key(
            &mut conn,
            &raw.source_system,
            &raw.source_item_id,
            raw.plant_code.as_deref(),
        )
        .await?;

        let produced_qty_lb = to_pounds("qty", raw.qty, &raw.uom)?;
        let scrap_qty_lb = to_pounds("scrap_qty", raw.scrap_qty, &raw.uom)?;

        let event = CanonicalProductionEvent {
            source_system: raw.source_system,
            source_event_id: raw.source_event_id,
            event_ts: raw.event_ts,
            plant_code: raw.plant_code,
            product_key,
            produced_qty_lb,
            scrap_qty_lb,
        };

        let status = IngestStatus::from_inserted(insert_if_new(&mut conn, &event).await?);

        info!(
            "Ingested {}/{}: {} (product_key {}, {:.3} lb)",
            event.source_system,
            event.source_event_id,
            status.as_str(),
            event.product_key,
            event.produced_qty_lb
        );

        Ok(IngestResponse { status, event })
    }
}

/// Convert to pounds, rejecting results that overflow to infinity
fn to_pounds(field: &str, quantity: f64, uom: &str) -> Result<f64, IngestError> {
    let pounds = units::convert(quantity, uom)?;
    if !pounds.is_finite() {
        return Err(IngestError::Validation(format!(
            "Invalid production event: '{}' of {} {} is not finite in pounds",
            field, quantity, uom
        )));
    }
    Ok(pounds)
}
