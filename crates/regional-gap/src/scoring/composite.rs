use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::normalize::{mean, round2};
use super::session::ScoringSession;
use crate::indicators::{ProvinceDirectory, UNKNOWN_PROVINCE};
use crate::store::{IndicatorStore, StoreError};

/// Unweighted mean of a province's per-collection scores for one year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompositeScore {
    pub province_id: String,
    pub province_name: String,
    pub year: i32,
    pub composite_score: f64,
    /// Rounded per-collection scores keyed by display name.
    pub collection_scores: BTreeMap<String, f64>,
    pub collections_scored: usize,
    pub rank: Option<usize>,
    pub calculated_at: DateTime<Utc>,
}

/// Composite for one province, `None` when no configured collection has a
/// value for it in `year`.
pub(crate) async fn composite_in_session<S, P>(
    session: &mut ScoringSession<'_, S>,
    provinces: &P,
    province_id: &str,
    year: i32,
) -> Result<Option<CompositeScore>, StoreError>
where
    S: IndicatorStore + ?Sized,
    P: ProvinceDirectory + ?Sized,
{
    let registry = session.registry();
    let mut raw_scores = Vec::new();
    let mut collection_scores = BTreeMap::new();

    for config in registry.iter() {
        let scores = session.collection_scores(config, year).await?;
        if let Some(score) = scores.score_for(province_id) {
            raw_scores.push(score);
            collection_scores.insert(config.display_name.clone(), round2(score));
        }
    }

    let Some(average) = mean(&raw_scores) else {
        return Ok(None);
    };

    let province_name = provinces
        .resolve_name(province_id)
        .await
        .unwrap_or_else(|| UNKNOWN_PROVINCE.to_string());

    Ok(Some(CompositeScore {
        province_id: province_id.to_string(),
        province_name,
        year,
        composite_score: round2(average),
        collection_scores,
        collections_scored: raw_scores.len(),
        rank: None,
        calculated_at: Utc::now(),
    }))
}
