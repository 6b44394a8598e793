use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use super::normalize::{bounds, min_max_score};
use crate::indicators::{CollectionConfig, FieldValue, IndicatorRecord};

/// One province's extracted scalar for a collection and year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProvinceValue {
    pub province_id: String,
    pub value: f64,
}

/// Per-province 0..=100 scores for one `(collection, year)` peer group.
///
/// A province absent from `scores` had no usable value; that is different
/// from scoring 0.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectionScores {
    pub values: Vec<ProvinceValue>,
    pub scores: BTreeMap<String, f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub records_read: usize,
    /// Records whose field was missing, null or non-numeric.
    pub skipped: usize,
    /// Every province code seen in the records, scored or not.
    pub record_province_ids: BTreeSet<String>,
}

impl CollectionScores {
    pub fn from_records(config: &CollectionConfig, records: &[IndicatorRecord]) -> Self {
        let mut values = Vec::with_capacity(records.len());
        let mut skipped = 0;
        let mut record_province_ids = BTreeSet::new();

        for record in records {
            record_province_ids.insert(record.province_id.clone());
            match config.field_path.resolve(record) {
                FieldValue::Number(value) => values.push(ProvinceValue {
                    province_id: record.province_id.clone(),
                    value,
                }),
                FieldValue::Null | FieldValue::Missing | FieldValue::NonNumeric => skipped += 1,
            }
        }

        let pool: Vec<f64> = values.iter().map(|item| item.value).collect();
        let range = bounds(&pool);
        let scores = match range {
            Some((min, max)) => values
                .iter()
                .map(|item| {
                    let score = min_max_score(item.value, min, max, config.lower_is_better);
                    (item.province_id.clone(), score)
                })
                .collect(),
            None => BTreeMap::new(),
        };

        Self {
            values,
            scores,
            min: range.map(|(min, _)| min),
            max: range.map(|(_, max)| max),
            records_read: records.len(),
            skipped,
            record_province_ids,
        }
    }

    pub fn score_for(&self, province_id: &str) -> Option<f64> {
        self.scores.get(province_id).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}
