//! Production event shapes
//!
//! A source payload is transformed by its plugin into the
//! [`RawProductionEvent`] shape, then resolved and normalized into a
//! [`CanonicalProductionEvent`].

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::IngestError;
use crate::plugins::Payload;

/// Unit assumed when a source omits one
pub const DEFAULT_UOM: &str = "LB";

/// Production event in the uniform intermediate shape, before product
/// resolution and unit conversion. Lives for a single ingest call.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawProductionEvent {
    pub source_system: String,
    pub source_event_id: String,
    pub event_ts: NaiveDateTime,
    #[serde(default)]
    pub plant_code: Option<String>,
    pub source_item_id: String,
    #[serde(default)]
    pub source_item_desc: Option<String>,
    /// Quantity in `uom`
    #[serde(deserialize_with = "deserialize_quantity")]
    pub qty: f64,
    #[serde(default = "default_uom")]
    pub uom: String,
    #[serde(default, deserialize_with = "deserialize_quantity")]
    pub scrap_qty: f64,
}

fn default_uom() -> String {
    DEFAULT_UOM.to_string()
}

/// Accepts JSON numbers and numeric strings; rejects null and non-finite values
fn deserialize_quantity<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let value = Value::deserialize(deserializer)?;
    let number = match &value {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| D::Error::custom(format!("quantity out of range: {}", n)))?,
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| D::Error::custom(format!("quantity is not numeric: {:?}", s)))?,
        other => return Err(D::Error::custom(format!("quantity must be a number, got {}", other))),
    };

    if !number.is_finite() {
        return Err(D::Error::custom(format!("quantity must be finite, got {}", value)));
    }
    Ok(number)
}

impl RawProductionEvent {
    /// Coerce a plugin's output into the intermediate event
    ///
    /// Any shape violation is a [`IngestError::Validation`].
    pub fn from_shape(shape: Payload) -> Result<Self, IngestError> {
        let raw: Self = serde_json::from_value(Value::Object(shape))
            .map_err(|e| IngestError::Validation(format!("Invalid production event: {}", e)))?;
        raw.validate()?;
        Ok(raw)
    }

    fn validate(&self) -> Result<(), IngestError> {
        let required = [
            ("source_system", &self.source_system),
            ("source_event_id", &self.source_event_id),
            ("source_item_id", &self.source_item_id),
            ("uom", &self.uom),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(IngestError::Validation(format!(
                    "Invalid production event: '{}' must not be empty",
                    field
                )));
            }
        }
        Ok(())
    }
}

/// Production event after product resolution and conversion to pounds
///
/// Quantities are always pounds whatever unit the source reported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalProductionEvent {
    pub source_system: String,
    pub source_event_id: String,
    pub event_ts: NaiveDateTime,
    pub plant_code: Option<String>,
    pub product_key: i64,
    pub produced_qty_lb: f64,
    pub scrap_qty_lb: f64,
}

/// Outcome of an ingest call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IngestStatus {
    Inserted,
    Duplicate,
}

impl IngestStatus {
    pub fn from_inserted(inserted: bool) -> Self {
        if inserted {
            IngestStatus::Inserted
        } else {
            IngestStatus::Duplicate
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            IngestStatus::Inserted => "inserted",
            IngestStatus::Duplicate => "duplicate",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestResponse {
    pub status: IngestStatus,
    pub event: CanonicalProductionEvent,
}
