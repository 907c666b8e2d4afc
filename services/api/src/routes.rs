use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Extension, Json, Router};
use eduledger::workflows::eligibility::{eligibility_router, EligibilityService, LedgerClient};
use serde_json::json;
use std::sync::atomic::Ordering;
use std::sync::Arc;

const PROMETHEUS_TEXT: &str = "text/plain; version=0.0.4";

/// Eligibility API plus the operational probes.
pub(crate) fn with_eligibility_routes<L>(service: Arc<EligibilityService<L>>) -> Router
where
    L: LedgerClient + 'static,
{
    eligibility_router(service)
        .route("/health", get(liveness))
        .route("/ready", get(readiness))
        .route("/metrics", get(prometheus_metrics))
}

async fn liveness() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn readiness(Extension(state): Extension<AppState>) -> Response {
    let (status, label) = if state.readiness.load(Ordering::Acquire) {
        (StatusCode::OK, "ready")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "starting")
    };
    (status, Json(json!({ "status": label }))).into_response()
}

async fn prometheus_metrics(Extension(state): Extension<AppState>) -> Response {
    ([(header::CONTENT_TYPE, PROMETHEUS_TEXT)], state.metrics.render()).into_response()
}
