use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::fmt;

/// One stored document: a province/year pair plus the indicator-specific payload.
///
/// The payload is kept as raw JSON because every collection nests its values
/// differently (semester splits, monthly series, per-sector tables, scalars).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorRecord {
    pub province_id: String,
    pub tahun: i32,
    #[serde(flatten)]
    pub values: Map<String, Value>,
}

impl IndicatorRecord {
    pub fn new(province_id: impl Into<String>, tahun: i32) -> Self {
        Self {
            province_id: province_id.into(),
            tahun,
            values: Map::new(),
        }
    }

    /// Builder used by fixtures and the CSV importer.
    pub fn with_value(mut self, path: &FieldPath, value: Value) -> Self {
        path.assign(&mut self.values, value);
        self
    }

    pub fn with_number(self, path: &str, value: f64) -> Self {
        match FieldPath::parse(path) {
            Ok(parsed) => {
                let value = Number::from_f64(value)
                    .map(Value::Number)
                    .unwrap_or(Value::Null);
                self.with_value(&parsed, value)
            }
            Err(_) => self,
        }
    }

    pub fn key(&self) -> (String, i32) {
        (self.province_id.clone(), self.tahun)
    }
}

/// Outcome of walking a [`FieldPath`] through a record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue {
    Number(f64),
    Null,
    Missing,
    NonNumeric,
}

impl FieldValue {
    pub fn as_number(self) -> Option<f64> {
        match self {
            FieldValue::Number(value) => Some(value),
            _ => None,
        }
    }
}

/// Dot-delimited path into a record payload, e.g. `data_semester_2.total`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath {
    raw: String,
    segments: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldPathError {
    #[error("field path is empty")]
    Empty,
    #[error("field path '{0}' contains an empty segment")]
    EmptySegment(String),
}

impl FieldPath {
    pub fn parse(raw: &str) -> Result<Self, FieldPathError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(FieldPathError::Empty);
        }

        let segments: Vec<String> = raw
            .split('.')
            .map(|segment| segment.trim().to_string())
            .collect();
        if segments.iter().any(String::is_empty) {
            return Err(FieldPathError::EmptySegment(raw.to_string()));
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn resolve(&self, record: &IndicatorRecord) -> FieldValue {
        self.resolve_in(&record.values)
    }

    pub fn resolve_in(&self, values: &Map<String, Value>) -> FieldValue {
        let (first, rest) = match self.segments.split_first() {
            Some(split) => split,
            None => return FieldValue::Missing,
        };

        let mut current = match values.get(first) {
            Some(value) => value,
            None => return FieldValue::Missing,
        };

        for segment in rest {
            current = match current.as_object().and_then(|object| object.get(segment)) {
                Some(value) => value,
                None => return FieldValue::Missing,
            };
        }

        match current {
            Value::Null => FieldValue::Null,
            Value::Number(number) => number
                .as_f64()
                .map(FieldValue::Number)
                .unwrap_or(FieldValue::NonNumeric),
            Value::String(text) => text
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|value| value.is_finite())
                .map(FieldValue::Number)
                .unwrap_or(FieldValue::NonNumeric),
            _ => FieldValue::NonNumeric,
        }
    }

    /// Writes `value` at this path, creating (or replacing non-object) parents.
    pub fn assign(&self, values: &mut Map<String, Value>, value: Value) {
        let (last, parents) = match self.segments.split_last() {
            Some(split) => split,
            None => return,
        };

        let mut current = values;
        for segment in parents {
            let slot = current
                .entry(segment.clone())
                .or_insert_with(|| Value::Object(Map::new()));
            if !slot.is_object() {
                *slot = Value::Object(Map::new());
            }
            current = match slot {
                Value::Object(object) => object,
                _ => return,
            };
        }

        current.insert(last.clone(), value);
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
