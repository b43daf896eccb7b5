//! Unit-of-measure normalization to pounds

use thiserror::Error;

/// Pounds per kilogram
pub const KG_TO_LB: f64 = 2.2046226218;

/// Unit outside the supported set; carries the unit exactly as received
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unsupported UOM: {unit:?}. Supported UOMs: LB, KG")]
pub struct UnsupportedUnitError {
    pub unit: String,
}

/// Convert `quantity` expressed in `unit` to pounds (unit match is case-insensitive)
pub fn convert(quantity: f64, unit: &str) -> Result<f64, UnsupportedUnitError> {
    match unit.to_ascii_uppercase().as_str() {
        "LB" => Ok(quantity),
        "KG" => Ok(quantity * KG_TO_LB),
        _ => Err(UnsupportedUnitError {
            unit: unit.to_string(),
        }),
    }
}
