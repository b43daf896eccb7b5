//! BEEF_WMS plugin
//!
//! Warehouse management events: plants are warehouses, items are SKUs and
//! quantities are reported as `produced` / `scrap`.

use serde_json::{json, Value};

use super::{
    event_timestamp, pick, pick_or, source_event_id, EventShape, Payload, SourcePlugin,
    TransformError,
};
use crate::models::DEFAULT_UOM;

pub const SOURCE_SYSTEM: &str = "BEEF_WMS";

#[derive(Debug, Clone, Copy, Default)]
pub struct BeefWmsPlugin;

impl SourcePlugin for BeefWmsPlugin {
    fn source_system(&self) -> &'static str {
        SOURCE_SYSTEM
    }

    fn transform(&self, payload: &Payload) -> Result<Payload, TransformError> {
        let shape = EventShape::new(SOURCE_SYSTEM, source_event_id(payload)?)
            .field("event_ts", event_timestamp(payload, &["event_ts", "ts"])?)
            .field("plant_code", pick(payload, &["plant_code", "warehouse"]))
            .field("source_item_id", pick(payload, &["source_item_id", "sku"]))
            .field(
                "source_item_desc",
                pick(payload, &["source_item_desc", "sku_desc"]),
            )
            .field("qty", Some(pick_or(payload, &["qty", "produced"], json!(0))))
            .field(
                "uom",
                Some(pick_or(payload, &["uom"], Value::from(DEFAULT_UOM))),
            )
            .field(
                "scrap_qty",
                Some(pick_or(payload, &["scrap_qty", "scrap"], json!(0))),
            )
            .build();

        Ok(shape)
    }
}
