use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use tracing::{debug, warn};

use super::collection::CollectionScores;
use crate::indicators::{CollectionConfig, IndicatorRegistry, ProvinceId};
use crate::store::{IndicatorStore, StoreError};

/// Request-scoped memo of collection scores keyed by `(collection, year)`.
///
/// Every collection is read from the store at most once per session, so a
/// bulk ranking and a breakdown computed in the same session see the same
/// snapshot of each collection.
pub struct ScoringSession<'a, S: ?Sized> {
    store: &'a S,
    registry: &'a IndicatorRegistry,
    cache: HashMap<(String, i32), Arc<CollectionScores>>,
}

impl<'a, S> ScoringSession<'a, S>
where
    S: IndicatorStore + ?Sized,
{
    pub fn new(store: &'a S, registry: &'a IndicatorRegistry) -> Self {
        Self {
            store,
            registry,
            cache: HashMap::new(),
        }
    }

    pub fn registry(&self) -> &'a IndicatorRegistry {
        self.registry
    }

    pub fn store(&self) -> &'a S {
        self.store
    }

    pub async fn collection_scores(
        &mut self,
        config: &CollectionConfig,
        year: i32,
    ) -> Result<Arc<CollectionScores>, StoreError> {
        let key = (config.collection.clone(), year);
        if let Some(cached) = self.cache.get(&key) {
            return Ok(cached.clone());
        }

        let records = self.store.find_by_year(&config.collection, year).await?;
        let scores = Arc::new(CollectionScores::from_records(config, &records));

        debug!(
            collection = %config.collection,
            year,
            records = scores.records_read,
            scored = scores.scores.len(),
            skipped = scores.skipped,
            min = ?scores.min,
            max = ?scores.max,
            "collection scored"
        );
        if scores.skipped > 0 {
            warn!(
                collection = %config.collection,
                field = %config.field_path,
                year,
                skipped = scores.skipped,
                "records without a numeric value were left out of the peer group"
            );
        }

        self.cache.insert(key, scores.clone());
        Ok(scores)
    }

    /// Union of valid province codes present in any configured collection for `year`,
    /// ascending.
    pub async fn discover_provinces(&mut self, year: i32) -> Result<BTreeSet<String>, StoreError> {
        let registry = self.registry;
        let mut provinces = BTreeSet::new();
        for config in registry.iter() {
            let scores = self.collection_scores(config, year).await?;
            provinces.extend(
                scores
                    .record_province_ids
                    .iter()
                    .filter(|province_id| ProvinceId::parse(province_id).is_ok())
                    .cloned(),
            );
        }
        Ok(provinces)
    }
}
