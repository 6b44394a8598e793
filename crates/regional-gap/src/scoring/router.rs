use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::service::{ScoringError, YearScoringService};
use crate::error::json_error;
use crate::indicators::ProvinceDirectory;
use crate::store::IndicatorStore;

pub(crate) const MIN_YEAR: i32 = 2000;
pub(crate) const MAX_YEAR: i32 = 2100;
const DEFAULT_COUNT: usize = 5;
const MAX_COUNT: usize = 50;

/// Router exposing the ranking, breakdown and statistics endpoints.
pub fn year_scores_router<S, P>(service: Arc<YearScoringService<S, P>>) -> Router
where
    S: IndicatorStore + 'static,
    P: ProvinceDirectory + 'static,
{
    Router::new()
        .route(
            "/api/v1/year-scores/available-years",
            get(available_years_handler::<S, P>),
        )
        .route(
            "/api/v1/year-scores/debug/:collection/:year",
            get(debug_collection_handler::<S, P>),
        )
        .route("/api/v1/year-scores/:year", get(year_scores_handler::<S, P>))
        .route("/api/v1/year-scores/:year/top", get(top_handler::<S, P>))
        .route(
            "/api/v1/year-scores/:year/bottom",
            get(bottom_handler::<S, P>),
        )
        .route(
            "/api/v1/year-scores/:year/statistics",
            get(statistics_handler::<S, P>),
        )
        .route(
            "/api/v1/year-scores/:year/movement",
            get(movement_handler::<S, P>),
        )
        .route(
            "/api/v1/year-scores/:year/:province_id",
            get(province_score_handler::<S, P>),
        )
        .route(
            "/api/v1/year-scores/:year/:province_id/breakdown",
            get(breakdown_handler::<S, P>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct CountParams {
    count: Option<usize>,
}

/// Parses a year path segment, rejecting anything outside `2000..=2100`.
pub(crate) fn parse_year(raw: &str) -> Result<i32, Response> {
    match raw.trim().parse::<i32>() {
        Ok(year) if (MIN_YEAR..=MAX_YEAR).contains(&year) => Ok(year),
        _ => Err(json_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            format!("year must be an integer between {MIN_YEAR} and {MAX_YEAR}"),
        )),
    }
}

fn parse_count(params: &CountParams) -> Result<usize, Response> {
    let count = params.count.unwrap_or(DEFAULT_COUNT);
    if (1..=MAX_COUNT).contains(&count) {
        Ok(count)
    } else {
        Err(json_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            format!("count must be between 1 and {MAX_COUNT}"),
        ))
    }
}

fn no_year_data(year: i32) -> Response {
    json_error(StatusCode::NOT_FOUND, format!("No data found for year {year}"))
}

fn no_province_data(province_id: &str, year: i32) -> Response {
    json_error(
        StatusCode::NOT_FOUND,
        format!("No data found for province {province_id} in year {year}"),
    )
}

fn scoring_failure(error: ScoringError) -> Response {
    json_error(StatusCode::INTERNAL_SERVER_ERROR, error.to_string())
}

pub(crate) async fn available_years_handler<S, P>(
    State(service): State<Arc<YearScoringService<S, P>>>,
) -> Response
where
    S: IndicatorStore + 'static,
    P: ProvinceDirectory + 'static,
{
    match service.available_years().await {
        Ok(years) => {
            let payload = json!({ "count": years.len(), "years": years });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(error) => scoring_failure(error),
    }
}

pub(crate) async fn year_scores_handler<S, P>(
    State(service): State<Arc<YearScoringService<S, P>>>,
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

    match service.calculate_all_scores_for_year(year).await {
        Ok(scores) if scores.is_empty() => no_year_data(year),
        Ok(scores) => (StatusCode::OK, Json(scores)).into_response(),
        Err(error) => scoring_failure(error),
    }
}

pub(crate) async fn top_handler<S, P>(
    State(service): State<Arc<YearScoringService<S, P>>>,
    Path(year): Path<String>,
    Query(params): Query<CountParams>,
) -> Response
where
    S: IndicatorStore + 'static,
    P: ProvinceDirectory + 'static,
{
    let (year, count) = match (parse_year(&year), parse_count(&params)) {
        (Ok(year), Ok(count)) => (year, count),
        (Err(response), _) | (_, Err(response)) => return response,
    };

    match service.top(year, count).await {
        Ok(scores) if scores.is_empty() => no_year_data(year),
        Ok(scores) => (StatusCode::OK, Json(scores)).into_response(),
        Err(error) => scoring_failure(error),
    }
}

pub(crate) async fn bottom_handler<S, P>(
    State(service): State<Arc<YearScoringService<S, P>>>,
    Path(year): Path<String>,
    Query(params): Query<CountParams>,
) -> Response
where
    S: IndicatorStore + 'static,
    P: ProvinceDirectory + 'static,
{
    let (year, count) = match (parse_year(&year), parse_count(&params)) {
        (Ok(year), Ok(count)) => (year, count),
        (Err(response), _) | (_, Err(response)) => return response,
    };

    match service.bottom(year, count).await {
        Ok(scores) if scores.is_empty() => no_year_data(year),
        Ok(scores) => (StatusCode::OK, Json(scores)).into_response(),
        Err(error) => scoring_failure(error),
    }
}

pub(crate) async fn statistics_handler<S, P>(
    State(service): State<Arc<YearScoringService<S, P>>>,
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

    match service.national_statistics(year).await {
        Ok(Some(statistics)) => (StatusCode::OK, Json(statistics)).into_response(),
        Ok(None) => no_year_data(year),
        Err(error) => scoring_failure(error),
    }
}

pub(crate) async fn movement_handler<S, P>(
    State(service): State<Arc<YearScoringService<S, P>>>,
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

    match service.rank_movement(year).await {
        Ok(movement) if movement.is_empty() => no_year_data(year),
        Ok(movement) => (StatusCode::OK, Json(movement)).into_response(),
        Err(error) => scoring_failure(error),
    }
}

pub(crate) async fn province_score_handler<S, P>(
    State(service): State<Arc<YearScoringService<S, P>>>,
    Path((year, province_id)): Path<(String, String)>,
) -> Response
where
    S: IndicatorStore + 'static,
    P: ProvinceDirectory + 'static,
{
    let year = match parse_year(&year) {
        Ok(year) => year,
        Err(response) => return response,
    };

    match service.calculate_composite_score(&province_id, year).await {
        Ok(Some(score)) => (StatusCode::OK, Json(score)).into_response(),
        Ok(None) => no_province_data(&province_id, year),
        Err(error) => scoring_failure(error),
    }
}

pub(crate) async fn breakdown_handler<S, P>(
    State(service): State<Arc<YearScoringService<S, P>>>,
    Path((year, province_id)): Path<(String, String)>,
) -> Response
where
    S: IndicatorStore + 'static,
    P: ProvinceDirectory + 'static,
{
    let year = match parse_year(&year) {
        Ok(year) => year,
        Err(response) => return response,
    };

    match service.score_breakdown(&province_id, year).await {
        Ok(Some(breakdown)) => (StatusCode::OK, Json(breakdown)).into_response(),
        Ok(None) => no_province_data(&province_id, year),
        Err(error) => scoring_failure(error),
    }
}

pub(crate) async fn debug_collection_handler<S, P>(
    State(service): State<Arc<YearScoringService<S, P>>>,
    Path((collection, year)): Path<(String, String)>,
) -> Response
where
    S: IndicatorStore + 'static,
    P: ProvinceDirectory + 'static,
{
    let year = match parse_year(&year) {
        Ok(year) => year,
        Err(response) => return response,
    };

    match service.collection_snapshot(&collection, year).await {
        Ok(snapshot) => (StatusCode::OK, Json(snapshot)).into_response(),
        Err(error) => scoring_failure(error),
    }
}
