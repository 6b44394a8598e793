use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json, Router};
use regional_gap::analysis::{analysis_router, UnemploymentAnalysisService};
use regional_gap::indicators::{indicator_router, IndicatorState, ProvinceDirectory};
use regional_gap::scoring::{year_scores_router, YearScoringService};
use regional_gap::store::IndicatorStore;
use serde_json::json;
use std::sync::Arc;

/// Every dashboard router plus the operational endpoints.
pub(crate) fn with_dashboard_routes<S, P>(
    scoring: Arc<YearScoringService<S, P>>,
    analysis: Arc<UnemploymentAnalysisService<S, P>>,
    indicators: IndicatorState<S>,
) -> Router
where
    S: IndicatorStore + 'static,
    P: ProvinceDirectory + 'static,
{
    year_scores_router(scoring)
        .merge(analysis_router(analysis))
        .merge(indicator_router(indicators))
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
