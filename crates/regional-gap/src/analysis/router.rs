use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use super::service::{AnalysisError, UnemploymentAnalysisService};
use crate::error::json_error;
use crate::indicators::ProvinceDirectory;
use crate::scoring::router::{parse_year, MAX_YEAR, MIN_YEAR};
use crate::store::IndicatorStore;

/// Router exposing the unemployment gap, comparison and alert endpoints.
pub fn analysis_router<S, P>(service: Arc<UnemploymentAnalysisService<S, P>>) -> Router
where
    S: IndicatorStore + 'static,
    P: ProvinceDirectory + 'static,
{
    Router::new()
        .route(
            "/api/v1/analysis/unemployment/regional-gap/:year",
            get(regional_gap_handler::<S, P>),
        )
        .route(
            "/api/v1/analysis/unemployment/compare",
            get(compare_handler::<S, P>),
        )
        .route(
            "/api/v1/analysis/unemployment/alerts/:year",
            get(alerts_handler::<S, P>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct CompareParams {
    year_from: i32,
    year_to: i32,
}

fn analysis_failure(error: AnalysisError) -> Response {
    let status = match &error {
        AnalysisError::NoData(_) => StatusCode::NOT_FOUND,
        AnalysisError::InvalidRange => StatusCode::BAD_REQUEST,
        AnalysisError::Store(_) | AnalysisError::FieldPath(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    json_error(status, error.to_string())
}

pub(crate) async fn regional_gap_handler<S, P>(
    State(service): State<Arc<UnemploymentAnalysisService<S, P>>>,
    Path(year): Path<String>,
) -> Response
where
    S: IndicatorStore + 'static,
    P: ProvinceDirectory + 'static,
{
    let year = match parse_year(&year) {
        Ok(year) => year,
        Err(response) => return response,
    };

    match service.regional_gap(year).await {
        Ok(analysis) => (StatusCode::OK, Json(analysis)).into_response(),
        Err(error) => analysis_failure(error),
    }
}

pub(crate) async fn compare_handler<S, P>(
    State(service): State<Arc<UnemploymentAnalysisService<S, P>>>,
    Query(params): Query<CompareParams>,
) -> Response
where
    S: IndicatorStore + 'static,
    P: ProvinceDirectory + 'static,
{
    let in_range = |year: i32| (MIN_YEAR..=MAX_YEAR).contains(&year);
    if !in_range(params.year_from) || !in_range(params.year_to) {
        return json_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            format!("years must be between {MIN_YEAR} and {MAX_YEAR}"),
        );
    }

    match service.compare_years(params.year_from, params.year_to).await {
        Ok(comparison) => (StatusCode::OK, Json(comparison)).into_response(),
        Err(error) => analysis_failure(error),
    }
}

pub(crate) async fn alerts_handler<S, P>(
    State(service): State<Arc<UnemploymentAnalysisService<S, P>>>,
    Path(year): Path<String>,
) -> Response
where
    S: IndicatorStore + 'static,
    P: ProvinceDirectory + 'static,
{
    let year = match parse_year(&year) {
        Ok(year) => year,
        Err(response) => return response,
    };

    match service.critical_alerts(year).await {
        Ok(alerts) => (StatusCode::OK, Json(alerts)).into_response(),
        Err(error) => analysis_failure(error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::analysis::UNEMPLOYMENT_COLLECTION;
    use crate::indicators::{BpsProvinceDirectory, IndicatorRecord};
    use crate::store::InMemoryIndicatorStore;

    async fn router() -> Router {
        let store = InMemoryIndicatorStore::new();
        for (province_id, year, rate) in [
            ("31", 2023, 7.0),
            ("31", 2024, 6.0),
            ("94", 2023, 9.0),
            ("94", 2024, 11.0),
        ] {
            store
                .upsert(
                    UNEMPLOYMENT_COLLECTION,
                    IndicatorRecord::new(province_id, year).with_number("data.tahunan", rate),
                )
                .await
                .expect("seed");
        }
        let service =
            UnemploymentAnalysisService::new(Arc::new(store), Arc::new(BpsProvinceDirectory))
                .expect("service");
        analysis_router(Arc::new(service))
    }

    async fn get_json(uri: &str) -> (StatusCode, Value) {
        let response = router()
            .await
            .oneshot(Request::get(uri).body(Body::empty()).expect("request"))
            .await
            .expect("route executes");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let payload = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, payload)
    }

    #[tokio::test]
    async fn regional_gap_route_serialises_analysis() {
        let (status, payload) =
            get_json("/api/v1/analysis/unemployment/regional-gap/2024").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload["status"], "success");
        assert_eq!(payload["critical_provinces"], 1);
        assert_eq!(payload["provinces"][0]["province_id"], "31");
        assert_eq!(payload["provinces"][1]["alerts"][0]["type"], "critical_unemployment");
        assert_eq!(payload["provinces"][1]["score"]["severity"], "critical");
        assert_eq!(payload["provinces"][0]["trend"]["direction"], "improving");
    }

    #[tokio::test]
    async fn regional_gap_route_maps_errors() {
        let (status, payload) =
            get_json("/api/v1/analysis/unemployment/regional-gap/2030").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(payload["error"], "No data found for year 2030");

        let (status, _) = get_json("/api/v1/analysis/unemployment/regional-gap/1990").await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn compare_route_validates_query() {
        let (status, payload) =
            get_json("/api/v1/analysis/unemployment/compare?year_from=2023&year_to=2024").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload["provinces_improved"], 1);
        assert_eq!(payload["provinces_worsened"], 1);
        assert_eq!(payload["biggest_decline"]["province_id"], "94");

        let (status, payload) =
            get_json("/api/v1/analysis/unemployment/compare?year_from=2024&year_to=2023").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(payload["error"], "year_from must be less than year_to");

        let (status, _) =
            get_json("/api/v1/analysis/unemployment/compare?year_from=2023").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn alerts_route_lists_urgent_provinces() {
        let (status, payload) = get_json("/api/v1/analysis/unemployment/alerts/2024").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload["total_critical"], 1);
        assert_eq!(payload["provinces"][0]["province_id"], "94");
        assert_eq!(payload["provinces"][0]["severity"], "critical");
        assert_eq!(payload["provinces"][0]["rank"], 2);
    }
}
