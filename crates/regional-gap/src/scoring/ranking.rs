use std::collections::HashMap;

use serde::Serialize;

use super::composite::CompositeScore;
use super::normalize::{median, round2};

/// Sorts by composite score descending and numbers the result `1..=N`.
///
/// The sort is stable, so equal scores keep their input order.
pub fn assign_ranks(scores: &mut [CompositeScore]) {
    scores.sort_by(|left, right| right.composite_score.total_cmp(&left.composite_score));
    for (index, score) in scores.iter_mut().enumerate() {
        score.rank = Some(index + 1);
    }
}

/// The best `count` entries of a ranked list.
pub fn top(ranked: &[CompositeScore], count: usize) -> Vec<CompositeScore> {
    ranked.iter().take(count).cloned().collect()
}

/// The worst `count` entries of a ranked list, worst first.
pub fn bottom(ranked: &[CompositeScore], count: usize) -> Vec<CompositeScore> {
    ranked.iter().rev().take(count).cloned().collect()
}

/// A ranked entry paired with the province's rank in the previous year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankMovement {
    #[serde(flatten)]
    pub score: CompositeScore,
    pub previous_rank: Option<usize>,
    /// `previous_rank - rank`; positive means the province climbed.
    pub rank_delta: Option<i64>,
}

pub fn rank_movement(
    current: Vec<CompositeScore>,
    previous: &[CompositeScore],
) -> Vec<RankMovement> {
    let previous_ranks: HashMap<&str, usize> = previous
        .iter()
        .filter_map(|score| score.rank.map(|rank| (score.province_id.as_str(), rank)))
        .collect();

    current
        .into_iter()
        .map(|score| {
            let previous_rank = previous_ranks.get(score.province_id.as_str()).copied();
            let rank_delta = match (previous_rank, score.rank) {
                (Some(before), Some(now)) => Some(before as i64 - now as i64),
                _ => None,
            };
            RankMovement {
                score,
                previous_rank,
                rank_delta,
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProvinceInfo {
    pub province_id: String,
    pub province_name: String,
    pub score: f64,
}

impl From<&CompositeScore> for ProvinceInfo {
    fn from(value: &CompositeScore) -> Self {
        Self {
            province_id: value.province_id.clone(),
            province_name: value.province_name.clone(),
            score: value.composite_score,
        }
    }
}

/// Headline figures for a ranked year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NationalStatistics {
    pub year: i32,
    pub median_score: f64,
    pub leader: Option<ProvinceInfo>,
    pub critical: Option<ProvinceInfo>,
    pub total_population: u64,
    pub provinces_count: usize,
}

pub fn national_statistics(
    year: i32,
    ranked: &[CompositeScore],
    total_population: u64,
) -> Option<NationalStatistics> {
    let composites: Vec<f64> = ranked.iter().map(|score| score.composite_score).collect();
    let median_score = median(&composites)?;

    Some(NationalStatistics {
        year,
        median_score: round2(median_score),
        leader: ranked.first().map(ProvinceInfo::from),
        critical: ranked.last().map(ProvinceInfo::from),
        total_population,
        provinces_count: ranked.len(),
    })
}
