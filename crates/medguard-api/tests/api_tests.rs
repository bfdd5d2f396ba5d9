//! HTTP-level tests against the router, driven with `oneshot`.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use medguard_api::{create_app, AppState};
use medguard_core::{InputType, MemoryStore, SeedData, Settings};
use medguard_registry::{BrandCatalog, ManufacturerRegistry};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

const SEED: &str = include_str!("../../../testing/fixtures/seed.json");

fn state() -> AppState {
    let seed = SeedData::from_json(SEED).unwrap();
    AppState::new(
        Arc::new(MemoryStore::from_seed(seed)),
        ManufacturerRegistry::builtin().unwrap(),
        BrandCatalog::builtin().unwrap(),
        &Settings::default(),
    )
    .unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_verify_known_batch() {
    let (status, body) = send(
        create_app(state()),
        post_json(
            "/v1/verify/batch",
            json!({"batchNumber": "CPL-123456", "manufacturer": "Cipla Limited"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["verdict"], "SAFE");
    assert_eq!(body["medicineDetails"]["databaseMatch"], true);
    assert_eq!(body["medicineDetails"]["name"], "Ciplox 500");
    assert!(body["confidence"].as_f64().unwrap() > 90.0);
}

#[tokio::test]
async fn test_verify_counterfeit_batch() {
    let (status, body) = send(
        create_app(state()),
        post_json("/v1/verify/batch", json!({"batchNumber": "LUP-4040"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["verdict"], "HIGH_RISK_FAKE");
}

#[tokio::test]
async fn test_missing_batch_is_a_verdict_not_an_error() {
    let (status, body) = send(create_app(state()), post_json("/v1/verify/batch", json!({}))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["verdict"], "UNKNOWN");
    assert_eq!(body["confidence"], 0.0);
}

#[tokio::test]
async fn test_verify_medicine_name() {
    let (status, body) = send(
        create_app(state()),
        post_json("/v1/verify/medicine", json!({"medicineName": "crocin"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["verdict"], "UNKNOWN");
    assert_eq!(body["medicineDetails"]["brandName"], "Crocin");
    assert_eq!(body["sources"], json!(["BRAND_MAPPING", "REGISTRY"]));
}

#[tokio::test]
async fn test_verify_barcode_records_device() {
    let state = state();
    let request = Request::builder()
        .method("POST")
        .uri("/v1/verify/barcode?deviceId=kiosk-3")
        .header(header::CONTENT_TYPE, "application/octet-stream")
        .header("x-request-id", "trace-abc")
        .body(Body::from("CPL-123456|Cipla Limited"))
        .unwrap();

    let (status, body) = send(create_app(state.clone()), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["verdict"], "SAFE");

    let entries = state.scan_log.entries().await;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].input_type, InputType::Barcode);
    assert_eq!(entries[0].device_id.as_deref(), Some("kiosk-3"));
    assert_eq!(entries[0].trace_id.as_deref(), Some("trace-abc"));
    // oneshot requests carry no peer address
    assert!(entries[0].ip_address.is_none());
}

#[tokio::test]
async fn test_unreadable_barcode() {
    let request = Request::builder()
        .method("POST")
        .uri("/v1/verify/barcode")
        .body(Body::from(vec![0xffu8, 0x00, 0xfe]))
        .unwrap();

    let (status, body) = send(create_app(state()), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["verdict"], "UNKNOWN");
    assert_eq!(body["riskFlags"], json!(["barcode_read_failed"]));
}

#[tokio::test]
async fn test_analytics_routes() {
    let app = create_app(state());

    let (status, body) = send(app.clone(), get("/v1/analytics/corruption")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalFlags"], 1);
    assert_eq!(body["flags"][0]["type"], "BLACKLIST_ACCEPTED");

    let (status, body) = send(app.clone(), get("/v1/analytics/priority")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 5);

    let (status, body) = send(app.clone(), get("/v1/analytics/trust/sup-shady")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["risk"], "HIGH");

    let (status, body) = send(app, get("/v1/analytics/risk-map")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalSuppliers"], 3);
}

#[tokio::test]
async fn test_health_and_registry_stats() {
    let app = create_app(state());

    let (status, body) = send(app.clone(), get("/v1/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(body["manufacturers"].as_u64().unwrap() > 0);
    assert!(body["brands"].as_u64().unwrap() > 0);

    let (status, body) = send(app, get("/v1/registry/stats")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_object());
}

#[tokio::test]
async fn test_scan_stats_and_metrics() {
    let state = state();
    let app = create_app(state.clone());

    send(
        app.clone(),
        post_json("/v1/verify/batch", json!({"batchNumber": "LUP-4040"})),
    )
    .await;
    send(
        app.clone(),
        post_json("/v1/verify/batch", json!({"batchNumber": "CPL-123456"})),
    )
    .await;

    let (_, body) = send(app.clone(), get("/v1/scans/stats")).await;
    assert_eq!(body["total"], 2);
    assert_eq!(body["high_risk"], 1);
    assert_eq!(body["database_matches"], 2);

    assert_eq!(state.metrics.verifications(InputType::Batch, "HIGH_RISK_FAKE"), 1);

    let response = app.oneshot(get("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("medguard_verifications_total"));
}
