//! pdw-pricing library - plant pricing file load
//!
//! Scans a drop directory for pricing CSV files, loads new or changed ones
//! into `fact_price_by_plant` and records every attempt in
//! `etl_file_ingestion_state`.

pub mod discovery;
pub mod error;
pub mod job;
pub mod parse;
pub mod state;
pub mod upsert;

pub use error::{PricingError, Result};
pub use job::{run_once, PricingSource, RunSummary};
