use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::province::ProvinceId;
use super::record::IndicatorRecord;
use super::registry::IndicatorRegistry;
use crate::error::json_error;
use crate::store::{IndicatorStore, PageRequest, StoreError};

const DEFAULT_PAGE_SIZE: usize = 20;
const MAX_PAGE_SIZE: usize = 100;

/// Shared handles for the CRUD handlers.
pub struct IndicatorState<S> {
    pub store: Arc<S>,
    pub registry: Arc<IndicatorRegistry>,
}

impl<S> Clone for IndicatorState<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            registry: self.registry.clone(),
        }
    }
}

/// CRUD endpoints for every stored collection.
pub fn indicator_router<S>(state: IndicatorState<S>) -> Router
where
    S: IndicatorStore + 'static,
{
    Router::new()
        .route(
            "/api/v1/indicators/:collection",
            get(list_handler::<S>).post(create_handler::<S>),
        )
        .route(
            "/api/v1/indicators/:collection/province/:province_id",
            get(province_history_handler::<S>),
        )
        .route(
            "/api/v1/indicators/:collection/:province_id/:tahun",
            get(get_handler::<S>)
                .put(update_handler::<S>)
                .delete(delete_handler::<S>),
        )
        .with_state(state)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct PageParams {
    page: Option<usize>,
    page_size: Option<usize>,
}

#[derive(Debug, Serialize)]
struct PageView {
    data: Vec<IndicatorRecord>,
    total: usize,
    page: usize,
    page_size: usize,
}

fn unknown_collection(collection: &str) -> Response {
    json_error(
        StatusCode::NOT_FOUND,
        format!("collection '{collection}' not found"),
    )
}

fn record_not_found(collection: &str, province_id: &str, tahun: i32) -> Response {
    json_error(
        StatusCode::NOT_FOUND,
        format!("no {collection} record for province {province_id} in {tahun}"),
    )
}

fn store_failure(error: StoreError) -> Response {
    match error {
        StoreError::Conflict => json_error(StatusCode::CONFLICT, "record already exists"),
        StoreError::InvalidDocument(reason) => json_error(StatusCode::UNPROCESSABLE_ENTITY, reason),
        other => json_error(StatusCode::INTERNAL_SERVER_ERROR, other.to_string()),
    }
}

pub(crate) async fn list_handler<S>(
    State(state): State<IndicatorState<S>>,
    Path(collection): Path<String>,
    Query(params): Query<PageParams>,
) -> Response
where
    S: IndicatorStore + 'static,
{
    if !state.registry.is_stored_collection(&collection) {
        return unknown_collection(&collection);
    }

    let page = params.page.unwrap_or(1);
    let page_size = params.page_size.unwrap_or(DEFAULT_PAGE_SIZE);
    if page == 0 || !(1..=MAX_PAGE_SIZE).contains(&page_size) {
        return json_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            format!("page must be >= 1 and page_size between 1 and {MAX_PAGE_SIZE}"),
        );
    }

    match state
        .store
        .list(&collection, PageRequest { page, page_size })
        .await
    {
        Ok(listing) => {
            let view = PageView {
                data: listing.items,
                total: listing.total,
                page,
                page_size,
            };
            (StatusCode::OK, Json(view)).into_response()
        }
        Err(error) => store_failure(error),
    }
}

pub(crate) async fn create_handler<S>(
    State(state): State<IndicatorState<S>>,
    Path(collection): Path<String>,
    Json(record): Json<IndicatorRecord>,
) -> Response
where
    S: IndicatorStore + 'static,
{
    if !state.registry.is_stored_collection(&collection) {
        return unknown_collection(&collection);
    }
    if let Err(error) = ProvinceId::parse(&record.province_id) {
        return json_error(StatusCode::UNPROCESSABLE_ENTITY, error.to_string());
    }

    match state.store.insert(&collection, record).await {
        Ok(created) => (StatusCode::CREATED, Json(created)).into_response(),
        Err(error) => store_failure(error),
    }
}

pub(crate) async fn province_history_handler<S>(
    State(state): State<IndicatorState<S>>,
    Path((collection, province_id)): Path<(String, String)>,
) -> Response
where
    S: IndicatorStore + 'static,
{
    if !state.registry.is_stored_collection(&collection) {
        return unknown_collection(&collection);
    }

    match state.store.find_by_province(&collection, &province_id).await {
        Ok(records) if records.is_empty() => json_error(
            StatusCode::NOT_FOUND,
            format!("no {collection} records for province {province_id}"),
        ),
        Ok(records) => (StatusCode::OK, Json(records)).into_response(),
        Err(error) => store_failure(error),
    }
}

pub(crate) async fn get_handler<S>(
    State(state): State<IndicatorState<S>>,
    Path((collection, province_id, tahun)): Path<(String, String, i32)>,
) -> Response
where
    S: IndicatorStore + 'static,
{
    if !state.registry.is_stored_collection(&collection) {
        return unknown_collection(&collection);
    }

    match state
        .store
        .find_one_by_province_and_year(&collection, &province_id, tahun)
        .await
    {
        Ok(Some(record)) => (StatusCode::OK, Json(record)).into_response(),
        Ok(None) => record_not_found(&collection, &province_id, tahun),
        Err(error) => store_failure(error),
    }
}

pub(crate) async fn update_handler<S>(
    State(state): State<IndicatorState<S>>,
    Path((collection, province_id, tahun)): Path<(String, String, i32)>,
    Json(fields): Json<Map<String, Value>>,
) -> Response
where
    S: IndicatorStore + 'static,
{
    if !state.registry.is_stored_collection(&collection) {
        return unknown_collection(&collection);
    }
    if fields.is_empty() {
        return json_error(StatusCode::BAD_REQUEST, "no fields to update");
    }

    match state
        .store
        .update(&collection, &province_id, tahun, fields)
        .await
    {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(StoreError::NotFound) => record_not_found(&collection, &province_id, tahun),
        Err(error) => store_failure(error),
    }
}

pub(crate) async fn delete_handler<S>(
    State(state): State<IndicatorState<S>>,
    Path((collection, province_id, tahun)): Path<(String, String, i32)>,
) -> Response
where
    S: IndicatorStore + 'static,
{
    if !state.registry.is_stored_collection(&collection) {
        return unknown_collection(&collection);
    }

    match state.store.delete(&collection, &province_id, tahun).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(StoreError::NotFound) => record_not_found(&collection, &province_id, tahun),
        Err(error) => store_failure(error),
    }
}
