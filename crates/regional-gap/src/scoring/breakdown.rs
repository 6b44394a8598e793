use serde::Serialize;

use super::normalize::{min_max_score, round2};
use super::session::ScoringSession;
use crate::store::{IndicatorStore, StoreError};

/// How one collection contributed to a province's composite.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollectionBreakdown {
    pub collection: String,
    pub display_name: String,
    pub raw_value: f64,
    pub score: f64,
    pub min_value: f64,
    pub max_value: f64,
    pub lower_is_better: bool,
    /// Records in this collection's peer group that had no numeric value.
    pub skipped_records: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub province_id: String,
    pub province_name: Option<String>,
    pub year: i32,
    pub composite_score: Option<f64>,
    pub rank: Option<usize>,
    pub collections: Vec<CollectionBreakdown>,
}

/// Re-reads the province's own record in every collection and scores it
/// against that collection's peer group.
pub(crate) async fn collections_in_session<S>(
    session: &mut ScoringSession<'_, S>,
    province_id: &str,
    year: i32,
) -> Result<Vec<CollectionBreakdown>, StoreError>
where
    S: IndicatorStore + ?Sized,
{
    let registry = session.registry();
    let store = session.store();
    let mut collections = Vec::new();

    for config in registry.iter() {
        let Some(record) = store
            .find_one_by_province_and_year(&config.collection, province_id, year)
            .await?
        else {
            continue;
        };
        let Some(raw_value) = config.field_path.resolve(&record).as_number() else {
            continue;
        };

        let pool = session.collection_scores(config, year).await?;
        let (Some(min_value), Some(max_value)) = (pool.min, pool.max) else {
            continue;
        };

        collections.push(CollectionBreakdown {
            collection: config.collection.clone(),
            display_name: config.display_name.clone(),
            raw_value,
            score: round2(min_max_score(
                raw_value,
                min_value,
                max_value,
                config.lower_is_better,
            )),
            min_value,
            max_value,
            lower_is_better: config.lower_is_better,
            skipped_records: pool.skipped,
        });
    }

    Ok(collections)
}
