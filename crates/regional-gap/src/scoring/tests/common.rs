use std::sync::Arc;

use async_trait::async_trait;
use axum::response::Response;
use serde_json::{Map, Value};

use crate::indicators::{BpsProvinceDirectory, IndicatorRecord, IndicatorRegistry};
use crate::scoring::YearScoringService;
use crate::store::{IndicatorStore, InMemoryIndicatorStore, Page, PageRequest, StoreError};

pub(super) const TPT: &str = "tingkat_pengangguran_terbuka";
pub(super) const IPM: &str = "indeks_pembangunan_manusia";
pub(super) const GINI: &str = "gini_ratio";

pub(super) fn tpt(province_id: &str, year: i32, agustus: f64) -> IndicatorRecord {
    IndicatorRecord::new(province_id, year).with_number("data.agustus", agustus)
}

pub(super) fn ipm(province_id: &str, year: i32, value: f64) -> IndicatorRecord {
    IndicatorRecord::new(province_id, year).with_number("data", value)
}

pub(super) fn gini(province_id: &str, year: i32, total: f64) -> IndicatorRecord {
    IndicatorRecord::new(province_id, year).with_number("data_semester_2.total", total)
}

pub(super) fn population(province_id: &str, year: i32, thousands: f64) -> IndicatorRecord {
    IndicatorRecord::new(province_id, year).with_number("data.jumlah_penduduk_ribu", thousands)
}

pub(super) async fn store_with(records: Vec<(&str, IndicatorRecord)>) -> InMemoryIndicatorStore {
    let store = InMemoryIndicatorStore::new();
    for (collection, record) in records {
        store.upsert(collection, record).await.expect("seed record");
    }
    store
}

/// 2024 fixture:
/// - unemployment 31=4.0, 32=6.0, 33=8.0 (scores 100, 50, 0)
/// - HDI 31=80, 32=70, 33=60 (scores 100, 50, 0)
/// - Gini only for 34 (degenerate, 50)
/// - population for 31 and 32
pub(super) async fn seeded_store() -> InMemoryIndicatorStore {
    store_with(vec![
        (TPT, tpt("31", 2024, 4.0)),
        (TPT, tpt("32", 2024, 6.0)),
        (TPT, tpt("33", 2024, 8.0)),
        (IPM, ipm("31", 2024, 80.0)),
        (IPM, ipm("32", 2024, 70.0)),
        (IPM, ipm("33", 2024, 60.0)),
        (GINI, gini("34", 2024, 0.38)),
        ("kependudukan", population("31", 2024, 10684.9)),
        ("kependudukan", population("32", 2024, 49860.3)),
    ])
    .await
}

pub(super) type TestService = YearScoringService<InMemoryIndicatorStore, BpsProvinceDirectory>;

pub(super) fn build_service(store: InMemoryIndicatorStore) -> TestService {
    let registry = IndicatorRegistry::bps_default().expect("default registry");
    YearScoringService::new(
        Arc::new(store),
        Arc::new(BpsProvinceDirectory),
        Arc::new(registry),
    )
}

pub(super) struct UnavailableStore;

fn offline() -> StoreError {
    StoreError::Unavailable("database offline".to_string())
}

#[async_trait]
impl IndicatorStore for UnavailableStore {
    async fn find_by_year(
        &self,
        _collection: &str,
        _tahun: i32,
    ) -> Result<Vec<IndicatorRecord>, StoreError> {
        Err(offline())
    }

    async fn find_one_by_province_and_year(
        &self,
        _collection: &str,
        _province_id: &str,
        _tahun: i32,
    ) -> Result<Option<IndicatorRecord>, StoreError> {
        Err(offline())
    }

    async fn distinct_years(&self, _collection: &str) -> Result<Vec<i32>, StoreError> {
        Err(offline())
    }

    async fn find_by_province(
        &self,
        _collection: &str,
        _province_id: &str,
    ) -> Result<Vec<IndicatorRecord>, StoreError> {
        Err(offline())
    }

    async fn list(&self, _collection: &str, _page: PageRequest) -> Result<Page, StoreError> {
        Err(offline())
    }

    async fn insert(
        &self,
        _collection: &str,
        _record: IndicatorRecord,
    ) -> Result<IndicatorRecord, StoreError> {
        Err(offline())
    }

    async fn update(
        &self,
        _collection: &str,
        _province_id: &str,
        _tahun: i32,
        _fields: Map<String, Value>,
    ) -> Result<IndicatorRecord, StoreError> {
        Err(offline())
    }

    async fn delete(
        &self,
        _collection: &str,
        _province_id: &str,
        _tahun: i32,
    ) -> Result<(), StoreError> {
        Err(offline())
    }

    async fn upsert(&self, _collection: &str, _record: IndicatorRecord) -> Result<(), StoreError> {
        Err(offline())
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}
