//! Document storage for indicator collections.
//!
//! Each collection holds [`IndicatorRecord`]s keyed by `(province_id, tahun)`.
//! Reads are independent per collection; there is no cross-collection
//! snapshot, so a composite computed during an import may mix old and new
//! values.

pub mod import;
pub mod memory;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::indicators::IndicatorRecord;

pub use import::{ImportError, ImportSummary, SeedImporter};
pub use memory::InMemoryIndicatorStore;

/// One page of a collection listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: usize,
    pub page_size: usize,
}

impl PageRequest {
    pub fn offset(&self) -> usize {
        self.page.saturating_sub(1).saturating_mul(self.page_size)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub items: Vec<IndicatorRecord>,
    pub total: usize,
}

/// Storage abstraction consumed by the scoring engine, the analysis rules
/// and the CRUD routes.
#[async_trait]
pub trait IndicatorStore: Send + Sync {
    async fn find_by_year(
        &self,
        collection: &str,
        tahun: i32,
    ) -> Result<Vec<IndicatorRecord>, StoreError>;

    async fn find_one_by_province_and_year(
        &self,
        collection: &str,
        province_id: &str,
        tahun: i32,
    ) -> Result<Option<IndicatorRecord>, StoreError>;

    /// Years present in the collection, ascending.
    async fn distinct_years(&self, collection: &str) -> Result<Vec<i32>, StoreError>;

    /// Every year for one province, newest first.
    async fn find_by_province(
        &self,
        collection: &str,
        province_id: &str,
    ) -> Result<Vec<IndicatorRecord>, StoreError>;

    async fn list(&self, collection: &str, page: PageRequest) -> Result<Page, StoreError>;

    async fn insert(
        &self,
        collection: &str,
        record: IndicatorRecord,
    ) -> Result<IndicatorRecord, StoreError>;

    /// Merges top-level fields into an existing record.
    async fn update(
        &self,
        collection: &str,
        province_id: &str,
        tahun: i32,
        fields: Map<String, Value>,
    ) -> Result<IndicatorRecord, StoreError>;

    async fn delete(
        &self,
        collection: &str,
        province_id: &str,
        tahun: i32,
    ) -> Result<(), StoreError>;

    async fn upsert(&self, collection: &str, record: IndicatorRecord) -> Result<(), StoreError>;
}

/// Error enumeration for store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("invalid document: {0}")]
    InvalidDocument(String),
}
