//! Integration tests for pdw-ingest API endpoints
//!
//! Tests cover:
//! - Health endpoint with registered sources
//! - Production ingest status codes and error bodies
//! - Dimension and pricing read endpoints with filters
//! - Admin seed token check

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use pdw_common::db::{init_memory_database, seed};
use pdw_ingest::{build_router, AppState, PluginRegistry};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tower::util::ServiceExt; // for `oneshot` method

const ADMIN_TOKEN: &str = "test-admin-token";

/// Test helper: In-memory database, optionally seeded
async fn setup_db(seeded: bool) -> SqlitePool {
    let pool = init_memory_database().await.unwrap();
    if seeded {
        seed(&pool).await.unwrap();
    }
    pool
}

fn setup_app(db: SqlitePool, admin_token: Option<&str>) -> axum::Router {
    let state = AppState::new(
        db,
        PluginRegistry::with_builtin_plugins(),
        admin_token.map(str::to_string),
    );
    build_router(state)
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn json_request(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Test helper: Extract JSON body from response
async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

fn pork_body() -> Value {
    json!({
        "source_system": "PORK_ERP",
        "source_event_id": "P-0001",
        "event_ts": "2026-02-21T09:00:00",
        "plant_code": "VA01",
        "source_item_id": "ITM-100221",
        "qty": 100,
        "uom": "LB",
        "scrap_qty": 2.5
    })
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_lists_sources() {
    let app = setup_app(setup_db(false).await, None);

    let response = app.oneshot(get_request("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "pdw-ingest");
    assert!(body["version"].is_string());
    assert!(body["uptime_seconds"].is_u64());
    assert_eq!(body["sources"], json!(["BEEF_WMS", "PORK_ERP", "POULTRY_MES"]));
}

// =============================================================================
// Ingest
// =============================================================================

#[tokio::test]
async fn test_ingest_then_duplicate() {
    let app = setup_app(setup_db(true).await, None);

    let response = app
        .clone()
        .oneshot(json_request("/ingest/production", &pork_body()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "inserted");
    assert_eq!(body["event"]["source_event_id"], "P-0001");
    assert_eq!(body["event"]["plant_code"], "VA01");
    assert_eq!(body["event"]["produced_qty_lb"], 100.0);
    assert_eq!(body["event"]["scrap_qty_lb"], 2.5);
    assert!(body["event"]["product_key"].is_i64());

    let response = app
        .oneshot(json_request("/ingest/production", &pork_body()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "duplicate");
}

#[tokio::test]
async fn test_ingest_error_status_codes() {
    let app = setup_app(setup_db(true).await, None);

    let mut unknown_source = pork_body();
    unknown_source["source_system"] = json!("UNKNOWN_SYSTEM");

    let mut unmapped = pork_body();
    unmapped["source_item_id"] = json!("ITM-999999");

    let mut bad_unit = pork_body();
    bad_unit["uom"] = json!("oz");

    let mut missing_event = pork_body();
    missing_event.as_object_mut().unwrap().remove("source_event_id");

    let cases = [
        (unknown_source, StatusCode::BAD_REQUEST, "PLUGIN_NOT_FOUND", "UNKNOWN_SYSTEM"),
        (unmapped, StatusCode::UNPROCESSABLE_ENTITY, "MAPPING_NOT_FOUND", "ITM-999999"),
        (bad_unit, StatusCode::BAD_REQUEST, "UNSUPPORTED_UOM", "oz"),
        (missing_event, StatusCode::BAD_REQUEST, "VALIDATION_ERROR", "source_event_id"),
    ];

    for (body, status, code, needle) in cases {
        let response = app
            .clone()
            .oneshot(json_request("/ingest/production", &body))
            .await
            .unwrap();
        assert_eq!(response.status(), status, "case {}", code);

        let error = extract_json(response.into_body()).await;
        assert_eq!(error["error"]["code"], code);
        assert!(
            error["error"]["message"].as_str().unwrap().contains(needle),
            "message for {} should mention {}",
            code,
            needle
        );
    }
}

#[tokio::test]
async fn test_ingest_rejects_non_object_body() {
    let app = setup_app(setup_db(true).await, None);

    let response = app
        .oneshot(json_request("/ingest/production", &json!([1, 2, 3])))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

// =============================================================================
// Dimensions and pricing
// =============================================================================

#[tokio::test]
async fn test_dim_plants_and_products() {
    let app = setup_app(setup_db(true).await, None);

    let response = app.clone().oneshot(get_request("/dim/plants")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let plants = extract_json(response.into_body()).await;
    let codes: Vec<&str> = plants
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["plant_code"].as_str().unwrap())
        .collect();
    assert_eq!(codes, vec!["NC02", "SC03", "VA01"]);

    let response = app
        .clone()
        .oneshot(get_request("/dim/plants?state=VA&is_active=true"))
        .await
        .unwrap();
    let plants = extract_json(response.into_body()).await;
    assert_eq!(plants.as_array().unwrap().len(), 1);
    assert_eq!(plants[0]["plant_code"], "VA01");

    let response = app
        .oneshot(get_request("/dim/products?protein_type=beef"))
        .await
        .unwrap();
    let products = extract_json(response.into_body()).await;
    assert_eq!(products.as_array().unwrap().len(), 1);
    assert_eq!(products[0]["canonical_sku"], "BEEF-CHUCK-001");
}

#[tokio::test]
async fn test_fact_pricing_filters() {
    let db = setup_db(true).await;
    sqlx::query(
        "INSERT INTO fact_price_by_plant
            (product_key, plant_code, price_per_lb, currency, effective_start_dt, is_current)
         SELECT product_key, 'VA01', 2.15, 'USD', '2026-01-01', 1
         FROM dim_product WHERE canonical_sku = 'PORK-LOIN-001'",
    )
    .execute(&db)
    .await
    .unwrap();
    let app = setup_app(db, None);

    let response = app
        .clone()
        .oneshot(get_request("/fact/pricing?plant_code=VA01&is_current=true"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let prices = extract_json(response.into_body()).await;
    assert_eq!(prices.as_array().unwrap().len(), 1);
    assert_eq!(prices[0]["canonical_sku"], "PORK-LOIN-001");
    assert_eq!(prices[0]["plant_name"], "Virginia Processing");
    assert_eq!(prices[0]["price_per_lb"], 2.15);

    let response = app
        .oneshot(get_request("/fact/pricing?protein_type=POULTRY"))
        .await
        .unwrap();
    let prices = extract_json(response.into_body()).await;
    assert!(prices.as_array().unwrap().is_empty());
}

// =============================================================================
// Admin
// =============================================================================

fn seed_request(token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("POST").uri("/admin/seed");
    if let Some(token) = token {
        builder = builder.header("X-Admin-Token", token);
    }
    builder.body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_admin_seed_with_token() {
    let app = setup_app(setup_db(false).await, Some(ADMIN_TOKEN));

    let response = app
        .clone()
        .oneshot(seed_request(Some(ADMIN_TOKEN)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(
        body["inserted"],
        json!({"products": 3, "plants": 3, "mappings": 3})
    );

    let response = app.oneshot(seed_request(Some(ADMIN_TOKEN))).await.unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(
        body["inserted"],
        json!({"products": 0, "plants": 0, "mappings": 0})
    );
}

#[tokio::test]
async fn test_admin_seed_rejects_bad_or_missing_token() {
    let app = setup_app(setup_db(false).await, Some(ADMIN_TOKEN));

    for token in [None, Some("wrong-token")] {
        let response = app.clone().oneshot(seed_request(token)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = extract_json(response.into_body()).await;
        assert_eq!(body["error"]["code"], "UNAUTHORIZED");
    }
}

#[tokio::test]
async fn test_admin_seed_disabled_without_configured_token() {
    let app = setup_app(setup_db(false).await, None);

    let response = app.oneshot(seed_request(Some(""))).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
