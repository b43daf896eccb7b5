//! PORK_ERP plugin
//!
//! Flat ERP export records. Older exports use `event_time`, `item_id` and
//! `item_desc`; current ones use the canonical names.

use serde_json::{json, Value};

use super::{
    event_timestamp, pick, pick_or, source_event_id, EventShape, Payload, SourcePlugin,
    TransformError,
};
use crate::models::DEFAULT_UOM;

pub const SOURCE_SYSTEM: &str = "PORK_ERP";

#[derive(Debug, Clone, Copy, Default)]
pub struct PorkErpPlugin;

impl SourcePlugin for PorkErpPlugin {
    fn source_system(&self) -> &'static str {
        SOURCE_SYSTEM
    }

    fn transform(&self, payload: &Payload) -> Result<Payload, TransformError> {
        let shape = EventShape::new(SOURCE_SYSTEM, source_event_id(payload)?)
            .field(
                "event_ts",
                event_timestamp(payload, &["event_ts", "event_time"])?,
            )
            .field("plant_code", pick(payload, &["plant_code"]))
            .field(
                "source_item_id",
                pick(payload, &["source_item_id", "item_id"]),
            )
            .field(
                "source_item_desc",
                pick(payload, &["source_item_desc", "item_desc"]),
            )
            .field("qty", Some(pick_or(payload, &["qty"], json!(0))))
            .field(
                "uom",
                Some(pick_or(payload, &["uom"], Value::from(DEFAULT_UOM))),
            )
            .field("scrap_qty", Some(pick_or(payload, &["scrap_qty"], json!(0))))
            .build();

        Ok(shape)
    }
}
