//! MedGuard API /v1: REST endpoints
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod state;

use axum::{
    routing::{get, post},
    Router,
};
use medguard_core::Settings;
use std::net::SocketAddr;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

pub use error::ApiError;
pub use metrics::{ApiMetrics, MeteredScanLog};
pub use state::AppState;

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/v1/verify/batch", post(handlers::verify_batch))
        .route("/v1/verify/medicine", post(handlers::verify_medicine))
        .route("/v1/verify/barcode", post(handlers::verify_barcode))
        .route("/v1/analytics/corruption", get(handlers::corruption))
        .route("/v1/analytics/priority", get(handlers::priority))
        .route("/v1/analytics/trust/{supplier_id}", get(handlers::trust_score))
        .route("/v1/analytics/risk-map", get(handlers::risk_map))
        .route("/v1/registry/stats", get(handlers::registry_stats))
        .route("/v1/scans/stats", get(handlers::scan_stats))
        .route("/v1/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::cors())
                .layer(axum::middleware::from_fn(middleware::request_context)),
        )
        .with_state(state)
}

pub async fn run(settings: Settings) -> anyhow::Result<()> {
    let state = AppState::from_settings(&settings)?;
    let app = create_app(state);
    let listener = tokio::net::TcpListener::bind(&settings.listen_addr).await?;

    tracing::info!("MedGuard API listening on {}", settings.listen_addr);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}
