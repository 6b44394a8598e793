use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use super::breakdown::{collections_in_session, ScoreBreakdown};
use super::collection::ProvinceValue;
use super::composite::{composite_in_session, CompositeScore};
use super::ranking::{self, NationalStatistics, RankMovement};
use super::session::ScoringSession;
use crate::indicators::{
    FieldPath, IndicatorRegistry, ProvinceDirectory, POPULATION_COLLECTION, POPULATION_FIELD,
};
use crate::store::{IndicatorStore, StoreError};

const SNAPSHOT_SAMPLE: usize = 5;

/// Year-based composite scoring over every configured collection.
///
/// Each public call opens its own [`ScoringSession`]; nothing is shared
/// between calls.
pub struct YearScoringService<S: ?Sized, P: ?Sized> {
    store: Arc<S>,
    provinces: Arc<P>,
    registry: Arc<IndicatorRegistry>,
}

/// Extracted value pool for one collection and year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollectionSnapshot {
    pub collection: String,
    pub year: i32,
    pub count: usize,
    pub skipped: usize,
    pub data: Vec<ProvinceValue>,
}

impl<S, P> YearScoringService<S, P>
where
    S: IndicatorStore + ?Sized + 'static,
    P: ProvinceDirectory + ?Sized + 'static,
{
    pub fn new(store: Arc<S>, provinces: Arc<P>, registry: Arc<IndicatorRegistry>) -> Self {
        Self {
            store,
            provinces,
            registry,
        }
    }

    pub fn registry(&self) -> &IndicatorRegistry {
        &self.registry
    }

    fn session(&self) -> ScoringSession<'_, S> {
        ScoringSession::new(self.store.as_ref(), self.registry.as_ref())
    }

    /// Province scores for one collection; empty for unknown collections or years.
    pub async fn calculate_collection_scores(
        &self,
        collection: &str,
        year: i32,
    ) -> Result<BTreeMap<String, f64>, ScoringError> {
        let Some(config) = self.registry.config_for(collection) else {
            return Ok(BTreeMap::new());
        };
        let scores = self.session().collection_scores(config, year).await?;
        Ok(scores.scores.clone())
    }

    pub async fn calculate_composite_score(
        &self,
        province_id: &str,
        year: i32,
    ) -> Result<Option<CompositeScore>, ScoringError> {
        let mut session = self.session();
        let composite =
            composite_in_session(&mut session, self.provinces.as_ref(), province_id, year).await?;
        Ok(composite)
    }

    /// Every discovered province's composite for `year`, ranked best first.
    pub async fn calculate_all_scores_for_year(
        &self,
        year: i32,
    ) -> Result<Vec<CompositeScore>, ScoringError> {
        let mut session = self.session();
        let ranked = self.ranked_in_session(&mut session, year).await?;
        Ok(ranked)
    }

    pub async fn top(&self, year: i32, count: usize) -> Result<Vec<CompositeScore>, ScoringError> {
        let ranked = self.calculate_all_scores_for_year(year).await?;
        Ok(ranking::top(&ranked, count))
    }

    pub async fn bottom(
        &self,
        year: i32,
        count: usize,
    ) -> Result<Vec<CompositeScore>, ScoringError> {
        let ranked = self.calculate_all_scores_for_year(year).await?;
        Ok(ranking::bottom(&ranked, count))
    }

    /// Per-collection explanation of a province's composite, `None` when it
    /// has no usable value in any collection.
    pub async fn score_breakdown(
        &self,
        province_id: &str,
        year: i32,
    ) -> Result<Option<ScoreBreakdown>, ScoringError> {
        let mut session = self.session();
        let collections = collections_in_session(&mut session, province_id, year).await?;
        if collections.is_empty() {
            return Ok(None);
        }

        let ranked = self.ranked_in_session(&mut session, year).await?;
        let composite = ranked
            .iter()
            .find(|score| score.province_id == province_id)
            .cloned();
        let composite = match composite {
            Some(found) => Some(found),
            // Codes outside the BPS range are never discovered, so rank them alone.
            None => {
                composite_in_session(&mut session, self.provinces.as_ref(), province_id, year)
                    .await?
            }
        };

        Ok(Some(ScoreBreakdown {
            province_id: province_id.to_string(),
            province_name: composite.as_ref().map(|score| score.province_name.clone()),
            year,
            composite_score: composite.as_ref().map(|score| score.composite_score),
            rank: composite.as_ref().and_then(|score| score.rank),
            collections,
        }))
    }

    /// Years with data in any configured collection, ascending.
    pub async fn available_years(&self) -> Result<Vec<i32>, ScoringError> {
        let mut years = BTreeSet::new();
        for config in self.registry.iter() {
            years.extend(self.store.distinct_years(&config.collection).await?);
        }
        Ok(years.into_iter().collect())
    }

    pub async fn national_statistics(
        &self,
        year: i32,
    ) -> Result<Option<NationalStatistics>, ScoringError> {
        let ranked = self.calculate_all_scores_for_year(year).await?;
        if ranked.is_empty() {
            return Ok(None);
        }

        let scored: BTreeSet<&str> = ranked
            .iter()
            .map(|score| score.province_id.as_str())
            .collect();
        let total_population = self.total_population(year, &scored).await?;

        Ok(ranking::national_statistics(year, &ranked, total_population))
    }

    /// Ranking for `year` annotated with each province's rank in `year - 1`.
    pub async fn rank_movement(&self, year: i32) -> Result<Vec<RankMovement>, ScoringError> {
        let mut session = self.session();
        let current = self.ranked_in_session(&mut session, year).await?;
        if current.is_empty() {
            return Ok(Vec::new());
        }
        let previous = self.ranked_in_session(&mut session, year - 1).await?;
        Ok(ranking::rank_movement(current, &previous))
    }

    /// Debug view of the value pool a collection contributes for `year`.
    pub async fn collection_snapshot(
        &self,
        collection: &str,
        year: i32,
    ) -> Result<CollectionSnapshot, ScoringError> {
        let Some(config) = self.registry.config_for(collection) else {
            return Ok(CollectionSnapshot {
                collection: collection.to_string(),
                year,
                count: 0,
                skipped: 0,
                data: Vec::new(),
            });
        };

        let scores = self.session().collection_scores(config, year).await?;
        Ok(CollectionSnapshot {
            collection: collection.to_string(),
            year,
            count: scores.values.len(),
            skipped: scores.skipped,
            data: scores.values.iter().take(SNAPSHOT_SAMPLE).cloned().collect(),
        })
    }

    async fn ranked_in_session(
        &self,
        session: &mut ScoringSession<'_, S>,
        year: i32,
    ) -> Result<Vec<CompositeScore>, StoreError> {
        let provinces = session.discover_provinces(year).await?;
        let mut results = Vec::with_capacity(provinces.len());

        for province_id in &provinces {
            if let Some(score) =
                composite_in_session(session, self.provinces.as_ref(), province_id, year).await?
            {
                results.push(score);
            }
        }

        ranking::assign_ranks(&mut results);
        info!(
            year,
            discovered = provinces.len(),
            ranked = results.len(),
            "year ranking computed"
        );
        Ok(results)
    }

    async fn total_population(
        &self,
        year: i32,
        scored: &BTreeSet<&str>,
    ) -> Result<u64, StoreError> {
        let field = FieldPath::parse(POPULATION_FIELD)
            .map_err(|error| StoreError::InvalidDocument(error.to_string()))?;
        let records = self.store.find_by_year(POPULATION_COLLECTION, year).await?;

        Ok(records
            .iter()
            .filter(|record| scored.contains(record.province_id.as_str()))
            .filter_map(|record| field.resolve(record).as_number())
            .map(|thousands| (thousands * 1000.0).round().max(0.0) as u64)
            .sum())
    }
}

/// Error raised by the scoring service.
#[derive(Debug, thiserror::Error)]
pub enum ScoringError {
    #[error(transparent)]
    Store(#[from] StoreError),
}
