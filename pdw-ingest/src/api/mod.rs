//! HTTP API handlers for pdw-ingest

pub mod admin;
pub mod auth;
pub mod dimensions;
pub mod health;
pub mod ingest;

pub use admin::seed_master_data;
pub use auth::admin_auth_middleware;
pub use dimensions::{list_plants, list_prices, list_products};
pub use health::health_routes;
pub use ingest::ingest_production;
