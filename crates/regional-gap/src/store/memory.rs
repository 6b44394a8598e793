use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use serde_json::{Map, Value};

use super::{IndicatorStore, Page, PageRequest, StoreError};
use crate::indicators::IndicatorRecord;

type RecordKey = (String, i32);
type Collections = HashMap<String, BTreeMap<RecordKey, IndicatorRecord>>;

/// Process-local store used by the service binary and tests.
#[derive(Debug, Default, Clone)]
pub struct InMemoryIndicatorStore {
    collections: Arc<RwLock<Collections>>,
}

impl InMemoryIndicatorStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Collections>, StoreError> {
        self.collections
            .read()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Collections>, StoreError> {
        self.collections
            .write()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".to_string()))
    }

    /// Number of records across every collection.
    pub fn len(&self) -> usize {
        self.read()
            .map(|guard| guard.values().map(BTreeMap::len).sum())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl IndicatorStore for InMemoryIndicatorStore {
    async fn find_by_year(
        &self,
        collection: &str,
        tahun: i32,
    ) -> Result<Vec<IndicatorRecord>, StoreError> {
        let guard = self.read()?;
        Ok(guard
            .get(collection)
            .map(|records| {
                records
                    .values()
                    .filter(|record| record.tahun == tahun)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn find_one_by_province_and_year(
        &self,
        collection: &str,
        province_id: &str,
        tahun: i32,
    ) -> Result<Option<IndicatorRecord>, StoreError> {
        let guard = self.read()?;
        Ok(guard
            .get(collection)
            .and_then(|records| records.get(&(province_id.to_string(), tahun)))
            .cloned())
    }

    async fn distinct_years(&self, collection: &str) -> Result<Vec<i32>, StoreError> {
        let guard = self.read()?;
        let years: BTreeSet<i32> = guard
            .get(collection)
            .map(|records| records.keys().map(|(_, tahun)| *tahun).collect())
            .unwrap_or_default();
        Ok(years.into_iter().collect())
    }

    async fn find_by_province(
        &self,
        collection: &str,
        province_id: &str,
    ) -> Result<Vec<IndicatorRecord>, StoreError> {
        let guard = self.read()?;
        let mut records: Vec<IndicatorRecord> = guard
            .get(collection)
            .map(|records| {
                records
                    .values()
                    .filter(|record| record.province_id == province_id)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        records.sort_by(|left, right| right.tahun.cmp(&left.tahun));
        Ok(records)
    }

    async fn list(&self, collection: &str, page: PageRequest) -> Result<Page, StoreError> {
        let guard = self.read()?;
        let Some(records) = guard.get(collection) else {
            return Ok(Page {
                items: Vec::new(),
                total: 0,
            });
        };

        let items = records
            .values()
            .skip(page.offset())
            .take(page.page_size)
            .cloned()
            .collect();

        Ok(Page {
            items,
            total: records.len(),
        })
    }

    async fn insert(
        &self,
        collection: &str,
        record: IndicatorRecord,
    ) -> Result<IndicatorRecord, StoreError> {
        let mut guard = self.write()?;
        let records = guard.entry(collection.to_string()).or_default();
        let key = record.key();
        if records.contains_key(&key) {
            return Err(StoreError::Conflict);
        }
        records.insert(key, record.clone());
        Ok(record)
    }

    async fn update(
        &self,
        collection: &str,
        province_id: &str,
        tahun: i32,
        fields: Map<String, Value>,
    ) -> Result<IndicatorRecord, StoreError> {
        if let Some(key) = fields
            .keys()
            .find(|key| matches!(key.as_str(), "province_id" | "tahun"))
        {
            return Err(StoreError::InvalidDocument(format!(
                "'{key}' identifies the record and cannot be updated"
            )));
        }

        let mut guard = self.write()?;
        let record = guard
            .get_mut(collection)
            .and_then(|records| records.get_mut(&(province_id.to_string(), tahun)))
            .ok_or(StoreError::NotFound)?;

        record.values.extend(fields);
        Ok(record.clone())
    }

    async fn delete(
        &self,
        collection: &str,
        province_id: &str,
        tahun: i32,
    ) -> Result<(), StoreError> {
        let mut guard = self.write()?;
        guard
            .get_mut(collection)
            .and_then(|records| records.remove(&(province_id.to_string(), tahun)))
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }

    async fn upsert(&self, collection: &str, record: IndicatorRecord) -> Result<(), StoreError> {
        let mut guard = self.write()?;
        guard
            .entry(collection.to_string())
            .or_default()
            .insert(record.key(), record);
        Ok(())
    }
}
