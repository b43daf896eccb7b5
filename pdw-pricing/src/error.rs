//! Error types for pdw-pricing

use thiserror::Error;

/// Pricing file load failure
///
/// Any of these fails the whole file; nothing from it is committed.
#[derive(Debug, Error)]
pub enum PricingError {
    #[error("CSV missing required headers: {0:?}")]
    MissingHeaders(Vec<&'static str>),

    #[error("Bad row at line {line}: {reason}")]
    BadRow { line: u64, reason: String },

    #[error("CSV is not valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Unknown canonical_sku(s) not found in dim_product: {0:?}")]
    UnknownSkus(Vec<String>),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PricingError>;
