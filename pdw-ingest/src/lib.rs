//! pdw-ingest library - production event ingestion service
//!
//! Source payloads from the plant systems are transformed by per-source
//! plugins, resolved to canonical products, converted to pounds and loaded
//! into `fact_production` at most once per (source_system, source_event_id).

use axum::Router;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod error;
pub mod loader;
pub mod mapping;
pub mod models;
pub mod orchestrator;
pub mod plugins;
pub mod units;

pub use error::{ApiError, IngestError};
pub use orchestrator::IngestOrchestrator;
pub use plugins::{PluginRegistry, SourcePlugin};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    pub orchestrator: Arc<IngestOrchestrator>,
    /// Token for admin routes; `None` refuses them all
    pub admin_token: Option<String>,
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    /// Create new application state
    pub fn new(db: SqlitePool, registry: PluginRegistry, admin_token: Option<String>) -> Self {
        Self {
            db,
            orchestrator: Arc::new(IngestOrchestrator::new(Arc::new(registry))),
            admin_token: admin_token.filter(|token| !token.is_empty()),
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::{get, post};

    let admin = Router::new()
        .route("/admin/seed", post(api::seed_master_data))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            api::admin_auth_middleware,
        ));

    let public = Router::new()
        .route("/ingest/production", post(api::ingest_production))
        .route("/dim/plants", get(api::list_plants))
        .route("/dim/products", get(api::list_products))
        .route("/fact/pricing", get(api::list_prices))
        .merge(api::health_routes());

    Router::new()
        .merge(admin)
        .merge(public)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
