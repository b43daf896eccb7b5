//! Pricing CSV parsing
//!
//! Expected header (any column order, extra columns ignored):
//! `plant_code,canonical_sku,price_per_lb,currency,effective_start_dt,effective_end_dt,is_current`

use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::{PricingError, Result};

pub const REQUIRED_HEADERS: [&str; 7] = [
    "plant_code",
    "canonical_sku",
    "price_per_lb",
    "currency",
    "effective_start_dt",
    "effective_end_dt",
    "is_current",
];

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// One validated pricing row
#[derive(Debug, Clone, PartialEq)]
pub struct PricingRow {
    pub plant_code: String,
    pub canonical_sku: String,
    pub price_per_lb: f64,
    /// Upper-cased, USD when blank
    pub currency: String,
    pub effective_start_dt: NaiveDate,
    pub effective_end_dt: Option<NaiveDate>,
    pub is_current: bool,
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    plant_code: Option<String>,
    canonical_sku: Option<String>,
    price_per_lb: Option<String>,
    currency: Option<String>,
    effective_start_dt: Option<String>,
    effective_end_dt: Option<String>,
    is_current: Option<String>,
}

/// Parse a whole pricing file
///
/// The first bad row fails the file; its error names the line number.
pub fn parse_pricing_csv(data: &[u8]) -> Result<Vec<PricingRow>> {
    let data = data.strip_prefix(UTF8_BOM).unwrap_or(data);
    let text = std::str::from_utf8(data)?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();
    let missing: Vec<&'static str> = REQUIRED_HEADERS
        .iter()
        .copied()
        .filter(|required| !headers.iter().any(|h| h == *required))
        .collect();
    if !missing.is_empty() {
        return Err(PricingError::MissingHeaders(missing));
    }

    let mut rows = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record?;
        let line = record
            .position()
            .map(|p| p.line())
            .unwrap_or(index as u64 + 2);

        let raw: CsvRow = record
            .deserialize(Some(&headers))
            .map_err(|e| PricingError::BadRow {
                line,
                reason: e.to_string(),
            })?;

        let row = validate_row(raw).map_err(|reason| PricingError::BadRow { line, reason })?;
        rows.push(row);
    }

    Ok(rows)
}

fn validate_row(raw: CsvRow) -> std::result::Result<PricingRow, String> {
    let plant_code = trimmed(raw.plant_code);
    let canonical_sku = trimmed(raw.canonical_sku);
    if plant_code.is_empty() || canonical_sku.is_empty() {
        return Err("plant_code and canonical_sku must be non-empty".to_string());
    }

    let price_text = trimmed(raw.price_per_lb);
    let price_per_lb = price_text
        .parse::<f64>()
        .ok()
        .filter(|p| p.is_finite())
        .ok_or_else(|| format!("invalid price_per_lb: {:?}", price_text))?;

    let currency = match trimmed(raw.currency) {
        c if c.is_empty() => "USD".to_string(),
        c => c.to_uppercase(),
    };

    let effective_start_dt = parse_date("effective_start_dt", &trimmed(raw.effective_start_dt))?;
    let end_text = trimmed(raw.effective_end_dt);
    let effective_end_dt = if end_text.is_empty() {
        None
    } else {
        Some(parse_date("effective_end_dt", &end_text)?)
    };

    Ok(PricingRow {
        plant_code,
        canonical_sku,
        price_per_lb,
        currency,
        effective_start_dt,
        effective_end_dt,
        is_current: parse_bool(&trimmed(raw.is_current)),
    })
}

fn trimmed(value: Option<String>) -> String {
    value.map(|v| v.trim().to_string()).unwrap_or_default()
}

fn parse_date(field: &str, value: &str) -> std::result::Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| format!("invalid {}: {:?}", field, value))
}

/// Anything outside 1/true/t/yes/y is false
pub fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "t" | "yes" | "y"
    )
}
