//! POULTRY_MES plugin
//!
//! Manufacturing execution events. Item identity may arrive nested under
//! `material` and quantities under `quantities`; flat fields are used when
//! the nested object is absent or empty.

use serde_json::{json, Value};

use super::{
    event_timestamp, nested_object, pick, pick_or, source_event_id, EventShape, Payload,
    SourcePlugin, TransformError,
};
use crate::models::DEFAULT_UOM;

pub const SOURCE_SYSTEM: &str = "POULTRY_MES";

#[derive(Debug, Clone, Copy, Default)]
pub struct PoultryMesPlugin;

impl SourcePlugin for PoultryMesPlugin {
    fn source_system(&self) -> &'static str {
        SOURCE_SYSTEM
    }

    fn transform(&self, payload: &Payload) -> Result<Payload, TransformError> {
        let (item_id, item_desc) = match nested_object(payload, "material") {
            Some(material) => (pick(material, &["id"]), pick(material, &["desc"])),
            None => (
                pick(payload, &["source_item_id"]),
                pick(payload, &["source_item_desc"]),
            ),
        };

        // Nested quantities carry no default for `good`; a missing value is rejected downstream
        let (qty, scrap, uom) = match nested_object(payload, "quantities") {
            Some(quantities) => (
                pick(quantities, &["good"]),
                pick_or(quantities, &["scrap"], json!(0)),
                unit_or_default(quantities),
            ),
            None => (
                Some(pick_or(payload, &["qty"], json!(0))),
                pick_or(payload, &["scrap_qty"], json!(0)),
                unit_or_default(payload),
            ),
        };

        let shape = EventShape::new(SOURCE_SYSTEM, source_event_id(payload)?)
            .field(
                "event_ts",
                event_timestamp(payload, &["event_ts", "event_time"])?,
            )
            .field("plant_code", pick(payload, &["plant_code"]))
            .field("source_item_id", item_id)
            .field("source_item_desc", item_desc)
            .field("qty", qty)
            .field("uom", Some(uom))
            .field("scrap_qty", Some(scrap))
            .build();

        Ok(shape)
    }
}

/// `uom` from `fields`; blank text counts as absent
fn unit_or_default(fields: &Payload) -> Value {
    match pick(fields, &["uom"]) {
        Some(Value::String(unit)) if unit.trim().is_empty() => Value::from(DEFAULT_UOM),
        Some(unit) => unit,
        None => Value::from(DEFAULT_UOM),
    }
}
