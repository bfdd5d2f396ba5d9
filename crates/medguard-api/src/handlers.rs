//! API Handlers
//!
//! Verification endpoints always answer 200 with a [`VerificationResult`];
//! "unable to verify" is a verdict, not an HTTP error.

use crate::error::ApiError;
use crate::state::AppState;
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::{Extension, Json};
use medguard_analytics::{CorruptionReport, PriorityEntry, RiskMap, TrustScore};
use medguard_core::{InputType, RequestContext, ScanStats, VerificationResult, MEDGUARD_VERSION};
use medguard_registry::RegistryStats;
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchRequest {
    #[serde(default)]
    pub batch_number: String,
    pub manufacturer: Option<String>,
    pub device_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicineRequest {
    #[serde(default)]
    pub medicine_name: String,
    pub batch_number: Option<String>,
    pub device_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceQuery {
    pub device_id: Option<String>,
}

fn with_device(ctx: RequestContext, device_id: Option<String>) -> RequestContext {
    match device_id.filter(|d| !d.trim().is_empty()) {
        Some(device) => ctx.with_device(device),
        None => ctx,
    }
}

pub async fn verify_batch(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Json(request): Json<BatchRequest>,
) -> Json<VerificationResult> {
    let ctx = with_device(ctx, request.device_id);
    let result = state
        .aggregator
        .verify_by_batch(&request.batch_number, request.manufacturer.as_deref(), &ctx)
        .await;
    state.metrics.observe(InputType::Batch, &result);
    Json(result)
}

pub async fn verify_medicine(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Json(request): Json<MedicineRequest>,
) -> Json<VerificationResult> {
    let ctx = with_device(ctx, request.device_id);
    let result = state
        .aggregator
        .verify_by_medicine_name(&request.medicine_name, request.batch_number.as_deref(), &ctx)
        .await;
    state.metrics.observe(InputType::MedicineName, &result);
    Json(result)
}

pub async fn verify_barcode(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Query(query): Query<DeviceQuery>,
    payload: Bytes,
) -> Json<VerificationResult> {
    let ctx = with_device(ctx, query.device_id);
    let result = state.aggregator.verify_by_barcode_image(&payload, &ctx).await;
    state.metrics.observe(InputType::Barcode, &result);
    Json(result)
}

pub async fn corruption(State(state): State<AppState>) -> Result<Json<CorruptionReport>, ApiError> {
    Ok(Json(state.analytics.detect_corruption_patterns().await?))
}

pub async fn priority(State(state): State<AppState>) -> Result<Json<Vec<PriorityEntry>>, ApiError> {
    Ok(Json(state.analytics.calculate_priority().await?))
}

pub async fn trust_score(
    State(state): State<AppState>,
    Path(supplier_id): Path<String>,
) -> Result<Json<TrustScore>, ApiError> {
    Ok(Json(state.analytics.calculate_trust_score(&supplier_id).await?))
}

pub async fn risk_map(State(state): State<AppState>) -> Result<Json<RiskMap>, ApiError> {
    Ok(Json(state.analytics.generate_risk_map().await?))
}

pub async fn registry_stats(State(state): State<AppState>) -> Json<RegistryStats> {
    Json(state.aggregator.registry().stats())
}

pub async fn scan_stats(State(state): State<AppState>) -> Json<ScanStats> {
    Json(state.scan_log.stats().await)
}

pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "version": MEDGUARD_VERSION,
            "manufacturers": state.aggregator.registry().len(),
            "brands": state.brands.len(),
        })),
    )
}

pub async fn metrics(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let body = state
        .metrics
        .encode()
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], body))
}
