//! Integration tests for the ingest pipeline
//!
//! Tests cover:
//! - Pork, beef and poultry payloads end to end against seeded master data
//! - Unit conversion applied to produced and scrap quantities
//! - Idempotent loading, including concurrent submissions
//! - Mapping precedence and fallback
//! - Error taxonomy (unknown source, unmapped item, unsupported unit, bad payload)

use chrono::NaiveDate;
use pdw_common::db::{init_database, init_memory_database, seed, FactProduction};
use pdw_ingest::models::IngestStatus;
use pdw_ingest::plugins::Payload;
use pdw_ingest::{IngestError, IngestOrchestrator, PluginRegistry};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use std::sync::Arc;
use tempfile::TempDir;

/// Test helper: In-memory database with demo master data
async fn seeded_pool() -> SqlitePool {
    let pool = init_memory_database().await.unwrap();
    seed(&pool).await.unwrap();
    pool
}

fn orchestrator() -> IngestOrchestrator {
    IngestOrchestrator::new(Arc::new(PluginRegistry::with_builtin_plugins()))
}

fn payload(value: Value) -> Payload {
    match value {
        Value::Object(map) => map,
        other => panic!("expected JSON object, got {}", other),
    }
}

fn pork_payload() -> Payload {
    payload(json!({
        "source_system": "PORK_ERP",
        "source_event_id": "P-0001",
        "event_ts": "2026-02-21T09:00:00",
        "plant_code": "VA01",
        "source_item_id": "ITM-100221",
        "qty": 100,
        "uom": "LB",
        "scrap_qty": 2.5
    }))
}

async fn product_key(pool: &SqlitePool, sku: &str) -> i64 {
    sqlx::query_scalar("SELECT product_key FROM dim_product WHERE canonical_sku = ?")
        .bind(sku)
        .fetch_one(pool)
        .await
        .unwrap()
}

async fn fact_rows(pool: &SqlitePool) -> Vec<FactProduction> {
    sqlx::query_as(
        "SELECT production_key, event_ts, plant_code, product_key, produced_qty_lb,
                scrap_qty_lb, source_system, source_event_id
         FROM fact_production ORDER BY production_key",
    )
    .fetch_all(pool)
    .await
    .unwrap()
}

async fn fact_count(pool: &SqlitePool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM fact_production")
        .fetch_one(pool)
        .await
        .unwrap()
}

// =============================================================================
// Happy path
// =============================================================================

#[tokio::test]
async fn test_pork_event_inserted() {
    let pool = seeded_pool().await;
    let expected_key = product_key(&pool, "PORK-LOIN-001").await;

    let response = orchestrator()
        .ingest_production(&pool, &pork_payload())
        .await
        .unwrap();

    assert_eq!(response.status, IngestStatus::Inserted);
    let event = response.event;
    assert_eq!(event.source_system, "PORK_ERP");
    assert_eq!(event.source_event_id, "P-0001");
    assert_eq!(event.plant_code.as_deref(), Some("VA01"));
    assert_eq!(event.product_key, expected_key);
    assert_eq!(event.produced_qty_lb, 100.0);
    assert_eq!(event.scrap_qty_lb, 2.5);
    assert_eq!(
        event.event_ts,
        NaiveDate::from_ymd_opt(2026, 2, 21)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    );

    let stored = fact_rows(&pool).await;
    assert_eq!(stored.len(), 1);
    let fact = &stored[0];
    assert!(fact.production_key > 0);
    assert_eq!(fact.source_system, "PORK_ERP");
    assert_eq!(fact.source_event_id, "P-0001");
    assert_eq!(fact.event_ts, event.event_ts);
    assert_eq!(fact.plant_code.as_deref(), Some("VA01"));
    assert_eq!(fact.product_key, expected_key);
    assert_eq!(fact.produced_qty_lb, 100.0);
    assert_eq!(fact.scrap_qty_lb, 2.5);
}

#[tokio::test]
async fn test_kilograms_converted_to_pounds() {
    let pool = seeded_pool().await;
    let mut p = pork_payload();
    p.insert("uom".into(), json!("KG"));
    p.insert("qty".into(), json!(1.0));
    p.insert("scrap_qty".into(), json!(0.5));

    let response = orchestrator().ingest_production(&pool, &p).await.unwrap();

    assert_eq!(response.status, IngestStatus::Inserted);
    assert!((response.event.produced_qty_lb - 2.2046226218).abs() < 1e-9);
    assert!((response.event.scrap_qty_lb - 1.1023113109).abs() < 1e-9);
}

#[tokio::test]
async fn test_beef_and_poultry_payloads() {
    let pool = seeded_pool().await;
    let orch = orchestrator();

    let beef = orch
        .ingest_production(
            &pool,
            &payload(json!({
                "source_system": "BEEF_WMS",
                "source_event_id": "B-0001",
                "ts": "2026-02-21 11:15:00",
                "warehouse": "NC02",
                "sku": "SKU-88910",
                "produced": "40",
                "scrap": 1
            })),
        )
        .await
        .unwrap();
    assert_eq!(beef.status, IngestStatus::Inserted);
    assert_eq!(beef.event.product_key, product_key(&pool, "BEEF-CHUCK-001").await);
    assert_eq!(beef.event.plant_code.as_deref(), Some("NC02"));
    assert_eq!(beef.event.produced_qty_lb, 40.0);

    let poultry = orch
        .ingest_production(
            &pool,
            &payload(json!({
                "source_system": "POULTRY_MES",
                "source_event_id": "C-0001",
                "event_time": "2026-02-21T13:45:00",
                "plant_code": "SC03",
                "material": {"id": "MAT-CHKBRS-77", "desc": "CHKN BRST BNLS"},
                "quantities": {"good": 10, "scrap": 0, "uom": "KG"}
            })),
        )
        .await
        .unwrap();
    assert_eq!(poultry.status, IngestStatus::Inserted);
    assert_eq!(
        poultry.event.product_key,
        product_key(&pool, "POULTRY-BREAST-001").await
    );
    assert!((poultry.event.produced_qty_lb - 22.046226218).abs() < 1e-9);
}

#[tokio::test]
async fn test_poultry_blank_uom_defaults_to_pounds() {
    let pool = seeded_pool().await;

    let nested = orchestrator()
        .ingest_production(
            &pool,
            &payload(json!({
                "source_system": "POULTRY_MES",
                "source_event_id": "C-0101",
                "event_ts": "2026-02-21T13:45:00",
                "plant_code": "SC03",
                "material": {"id": "MAT-CHKBRS-77"},
                "quantities": {"good": 10, "scrap": 1, "uom": ""}
            })),
        )
        .await
        .unwrap();
    assert_eq!(nested.event.produced_qty_lb, 10.0);
    assert_eq!(nested.event.scrap_qty_lb, 1.0);

    let flat = orchestrator()
        .ingest_production(
            &pool,
            &payload(json!({
                "source_system": "POULTRY_MES",
                "source_event_id": "C-0102",
                "event_ts": "2026-02-21T13:45:00",
                "plant_code": "SC03",
                "source_item_id": "MAT-CHKBRS-77",
                "qty": 5,
                "uom": ""
            })),
        )
        .await
        .unwrap();
    assert_eq!(flat.status, IngestStatus::Inserted);
    assert_eq!(flat.event.produced_qty_lb, 5.0);
}

// =============================================================================
// Idempotence
// =============================================================================

#[tokio::test]
async fn test_second_identical_ingest_is_duplicate() {
    let pool = seeded_pool().await;
    let orch = orchestrator();

    let first = orch.ingest_production(&pool, &pork_payload()).await.unwrap();
    let second = orch.ingest_production(&pool, &pork_payload()).await.unwrap();

    assert_eq!(first.status, IngestStatus::Inserted);
    assert_eq!(second.status, IngestStatus::Duplicate);
    assert_eq!(second.event, first.event);
    assert_eq!(fact_count(&pool).await, 1);
}

#[tokio::test]
async fn test_three_sources_plus_duplicate_leave_three_rows() {
    let pool = seeded_pool().await;
    let orch = orchestrator();

    let payloads = [
        pork_payload(),
        payload(json!({
            "source_system": "BEEF_WMS",
            "source_event_id": "B-0001",
            "event_ts": "2026-02-21T11:15:00",
            "plant_code": "NC02",
            "source_item_id": "SKU-88910",
            "qty": 40
        })),
        payload(json!({
            "source_system": "POULTRY_MES",
            "source_event_id": "C-0001",
            "event_ts": "2026-02-21T13:45:00",
            "plant_code": "SC03",
            "source_item_id": "MAT-CHKBRS-77",
            "qty": 25
        })),
        pork_payload(),
    ];

    let mut statuses = Vec::new();
    for p in &payloads {
        statuses.push(orch.ingest_production(&pool, p).await.unwrap().status);
    }

    assert_eq!(
        statuses,
        vec![
            IngestStatus::Inserted,
            IngestStatus::Inserted,
            IngestStatus::Inserted,
            IngestStatus::Duplicate
        ]
    );
    assert_eq!(fact_count(&pool).await, 3);
}

#[tokio::test]
async fn test_concurrent_ingest_inserts_once() {
    let temp_dir = TempDir::new().unwrap();
    let pool = init_database(&temp_dir.path().join("concurrent.db"))
        .await
        .unwrap();
    seed(&pool).await.unwrap();

    let orch = Arc::new(orchestrator());
    let mut handles = Vec::new();
    for _ in 0..8 {
        let orch = Arc::clone(&orch);
        let pool = pool.clone();
        handles.push(tokio::spawn(async move {
            orch.ingest_production(&pool, &pork_payload()).await
        }));
    }

    let mut inserted = 0;
    let mut duplicates = 0;
    for handle in handles {
        match handle.await.unwrap().unwrap().status {
            IngestStatus::Inserted => inserted += 1,
            IngestStatus::Duplicate => duplicates += 1,
        }
    }

    assert_eq!(inserted, 1);
    assert_eq!(duplicates, 7);
    assert_eq!(fact_count(&pool).await, 1);
}

// =============================================================================
// Mapping resolution
// =============================================================================

async fn add_mapping(pool: &SqlitePool, item: &str, plant: Option<&str>, sku: &str) {
    sqlx::query(
        "INSERT INTO map_product_source_to_canonical
            (source_system, source_item_id, product_key, plant_code, effective_start_dt, is_current)
         SELECT 'PORK_ERP', ?, product_key, ?, '2026-01-01', 1
         FROM dim_product WHERE canonical_sku = ?",
    )
    .bind(item)
    .bind(plant)
    .bind(sku)
    .execute(pool)
    .await
    .unwrap();
}

#[tokio::test]
async fn test_exact_plant_mapping_beats_fallback() {
    let pool = seeded_pool().await;
    // Plant-agnostic mapping for the same item points elsewhere
    add_mapping(&pool, "ITM-100221", None, "BEEF-CHUCK-001").await;

    let response = orchestrator()
        .ingest_production(&pool, &pork_payload())
        .await
        .unwrap();

    assert_eq!(response.event.product_key, product_key(&pool, "PORK-LOIN-001").await);
}

#[tokio::test]
async fn test_plant_agnostic_mapping_resolves_any_plant() {
    let pool = seeded_pool().await;
    add_mapping(&pool, "ITM-GENERIC", None, "PORK-LOIN-001").await;

    let orch = orchestrator();
    for (i, plant) in ["VA01", "NC02", "ZZ99"].iter().enumerate() {
        let mut p = pork_payload();
        p.insert("source_event_id".into(), json!(format!("P-GEN-{}", i)));
        p.insert("source_item_id".into(), json!("ITM-GENERIC"));
        p.insert("plant_code".into(), json!(plant));

        let response = orch.ingest_production(&pool, &p).await.unwrap();
        assert_eq!(response.status, IngestStatus::Inserted);
        assert_eq!(response.event.product_key, product_key(&pool, "PORK-LOIN-001").await);
    }
}

// =============================================================================
// Errors
// =============================================================================

#[tokio::test]
async fn test_unknown_source_system() {
    let pool = seeded_pool().await;
    let mut p = pork_payload();
    p.insert("source_system".into(), json!("UNKNOWN_SYSTEM"));

    let err = orchestrator().ingest_production(&pool, &p).await.unwrap_err();

    assert!(matches!(err, IngestError::PluginNotFound(ref e) if e.source_system == "UNKNOWN_SYSTEM"));
    assert!(err.to_string().contains("UNKNOWN_SYSTEM"));
    assert_eq!(fact_count(&pool).await, 0);
}

#[tokio::test]
async fn test_missing_source_system_is_validation_error() {
    let pool = seeded_pool().await;
    for p in [
        payload(json!({"source_event_id": "P-1"})),
        payload(json!({"source_system": "", "source_event_id": "P-1"})),
        payload(json!({"source_system": 7, "source_event_id": "P-1"})),
    ] {
        let err = orchestrator().ingest_production(&pool, &p).await.unwrap_err();
        assert!(matches!(err, IngestError::Validation(_)));
    }
}

#[tokio::test]
async fn test_unmapped_item() {
    let pool = seeded_pool().await;
    let mut p = pork_payload();
    p.insert("source_item_id".into(), json!("ITM-999999"));

    let err = orchestrator().ingest_production(&pool, &p).await.unwrap_err();

    match err {
        IngestError::MappingNotFound(e) => {
            assert_eq!(e.source_system, "PORK_ERP");
            assert_eq!(e.source_item_id, "ITM-999999");
            assert_eq!(e.plant_code.as_deref(), Some("VA01"));
        }
        other => panic!("expected MappingNotFound, got {:?}", other),
    }
    assert_eq!(fact_count(&pool).await, 0);
}

#[tokio::test]
async fn test_unsupported_unit() {
    let pool = seeded_pool().await;
    let mut p = pork_payload();
    p.insert("uom".into(), json!("oz"));

    let err = orchestrator().ingest_production(&pool, &p).await.unwrap_err();

    assert!(matches!(err, IngestError::Normalization(_)));
    assert!(err.to_string().contains("oz"));
    assert_eq!(fact_count(&pool).await, 0);
}

#[tokio::test]
async fn test_conversion_overflow_is_validation_error() {
    let pool = seeded_pool().await;
    let orch = orchestrator();

    let mut huge_qty = pork_payload();
    huge_qty.insert("qty".into(), json!(1e308));
    huge_qty.insert("uom".into(), json!("KG"));

    let mut huge_scrap = pork_payload();
    huge_scrap.insert("source_event_id".into(), json!("P-0002"));
    huge_scrap.insert("scrap_qty".into(), json!(1e308));
    huge_scrap.insert("uom".into(), json!("KG"));

    for p in [huge_qty, huge_scrap] {
        let err = orch.ingest_production(&pool, &p).await.unwrap_err();
        assert!(
            matches!(err, IngestError::Validation(ref msg) if msg.contains("finite")),
            "expected validation error, got {:?}",
            err
        );
    }
    assert_eq!(fact_count(&pool).await, 0);
}

#[tokio::test]
async fn test_invalid_payloads_are_validation_errors() {
    let pool = seeded_pool().await;
    let orch = orchestrator();

    let mut missing_event_id = pork_payload();
    missing_event_id.remove("source_event_id");

    let mut bad_ts = pork_payload();
    bad_ts.insert("event_ts".into(), json!("21/02/2026"));

    let mut bad_qty = pork_payload();
    bad_qty.insert("qty".into(), json!("a lot"));

    let poultry_without_good = payload(json!({
        "source_system": "POULTRY_MES",
        "source_event_id": "C-0009",
        "event_ts": "2026-02-21T13:45:00",
        "plant_code": "SC03",
        "material": {"id": "MAT-CHKBRS-77"},
        "quantities": {"scrap": 1}
    }));

    for p in [missing_event_id, bad_ts, bad_qty, poultry_without_good] {
        let err = orch.ingest_production(&pool, &p).await.unwrap_err();
        assert!(
            matches!(err, IngestError::Validation(_)),
            "expected validation error, got {:?}",
            err
        );
    }
    assert_eq!(fact_count(&pool).await, 0);
}
