//! # PDW Common Library
//!
//! Shared code for the protein data warehouse binaries:
//! - Error type shared by storage-facing code
//! - Bootstrap configuration (TOML + environment + defaults)
//! - SQLite schema creation, protein views and row models
//! - Master-data seeding

pub mod config;
pub mod db;
pub mod error;

pub use error::{Error, Result};
