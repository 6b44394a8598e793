use std::collections::{BTreeMap, BTreeSet};
use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use serde_json::{Number, Value};
use tracing::info;

use super::{IndicatorStore, StoreError};
use crate::indicators::{FieldPath, IndicatorRecord};

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("failed to read seed data: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid seed CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid seed JSON snapshot: {0}")]
    Json(#[from] serde_json::Error),
    #[error("could not write seed data: {0}")]
    Store(#[from] StoreError),
    #[error("line {line}: {reason}")]
    InvalidRow { line: usize, reason: String },
}

/// What a seed run wrote into the store.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    pub rows: usize,
    pub records_touched: usize,
    pub collections: BTreeSet<String>,
}

/// Loads JSON snapshots or long-format CSV files into an [`IndicatorStore`].
///
/// The CSV layout is one value per row:
///
/// ```text
/// collection,province_id,tahun,field,value
/// tingkat_pengangguran_terbuka,31,2024,data.agustus,6.21
/// ```
pub struct SeedImporter;

impl SeedImporter {
    /// Picks the format by extension: `.json` is a snapshot, anything else is CSV.
    pub async fn from_path<S, P>(store: &S, path: P) -> Result<ImportSummary, ImportError>
    where
        S: IndicatorStore + ?Sized,
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let is_json = path
            .extension()
            .and_then(|extension| extension.to_str())
            .is_some_and(|extension| extension.eq_ignore_ascii_case("json"));

        let summary = if is_json {
            Self::from_json_reader(store, file).await?
        } else {
            Self::from_csv_reader(store, file).await?
        };

        info!(
            path = %path.display(),
            rows = summary.rows,
            records = summary.records_touched,
            collections = summary.collections.len(),
            "seed data imported"
        );
        Ok(summary)
    }

    /// Snapshot shaped as `{ "<collection>": [record, ...] }`.
    pub async fn from_json_reader<S, R>(store: &S, reader: R) -> Result<ImportSummary, ImportError>
    where
        S: IndicatorStore + ?Sized,
        R: Read,
    {
        let snapshot: BTreeMap<String, Vec<IndicatorRecord>> = serde_json::from_reader(reader)?;
        let mut summary = ImportSummary::default();

        for (collection, records) in snapshot {
            for record in records {
                store.upsert(&collection, record).await?;
                summary.rows += 1;
                summary.records_touched += 1;
            }
            summary.collections.insert(collection);
        }

        Ok(summary)
    }

    pub async fn from_csv_reader<S, R>(store: &S, reader: R) -> Result<ImportSummary, ImportError>
    where
        S: IndicatorStore + ?Sized,
        R: Read,
    {
        let rows = parse_rows(reader)?;
        let mut pending: BTreeMap<(String, String, i32), IndicatorRecord> = BTreeMap::new();

        for row in &rows {
            let key = (row.collection.clone(), row.province_id.clone(), row.tahun);
            if !pending.contains_key(&key) {
                let existing = store
                    .find_one_by_province_and_year(&row.collection, &row.province_id, row.tahun)
                    .await?;
                let record = existing
                    .unwrap_or_else(|| IndicatorRecord::new(row.province_id.clone(), row.tahun));
                pending.insert(key.clone(), record);
            }

            if let Some(record) = pending.get_mut(&key) {
                row.field.assign(&mut record.values, row.value.clone());
            }
        }

        let mut summary = ImportSummary {
            rows: rows.len(),
            ..ImportSummary::default()
        };
        for ((collection, _, _), record) in pending {
            store.upsert(&collection, record).await?;
            summary.records_touched += 1;
            summary.collections.insert(collection);
        }

        Ok(summary)
    }
}

#[derive(Debug)]
struct SeedRow {
    collection: String,
    province_id: String,
    tahun: i32,
    field: FieldPath,
    value: Value,
}

#[derive(Debug, Deserialize)]
struct RawSeedRow {
    collection: String,
    province_id: String,
    tahun: i32,
    field: String,
    #[serde(default)]
    value: String,
}

fn parse_rows<R: Read>(reader: R) -> Result<Vec<SeedRow>, ImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut rows = Vec::new();

    for (index, record) in csv_reader.deserialize::<RawSeedRow>().enumerate() {
        let raw = record?;
        // Header is line 1.
        let line = index + 2;
        let invalid = |reason: String| ImportError::InvalidRow { line, reason };

        if raw.collection.is_empty() {
            return Err(invalid("collection is empty".to_string()));
        }
        if raw.province_id.is_empty() {
            return Err(invalid("province_id is empty".to_string()));
        }
        let field = FieldPath::parse(&raw.field).map_err(|error| invalid(error.to_string()))?;
        let value = parse_value(&raw.value).map_err(invalid)?;

        rows.push(SeedRow {
            collection: raw.collection,
            province_id: raw.province_id,
            tahun: raw.tahun,
            field,
            value,
        });
    }

    Ok(rows)
}

fn parse_value(raw: &str) -> Result<Value, String> {
    if raw.is_empty() {
        return Ok(Value::Null);
    }

    let number: f64 = raw
        .parse()
        .map_err(|_| format!("value '{raw}' is not numeric"))?;
    Number::from_f64(number)
        .map(Value::Number)
        .ok_or_else(|| format!("value '{raw}' is not a finite number"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryIndicatorStore;
    use serde_json::json;
    use std::io::Cursor;

    #[tokio::test]
    async fn csv_rows_merge_into_one_record_per_key() {
        let store = InMemoryIndicatorStore::new();
        let csv = "collection,province_id,tahun,field,value\n\
gini_ratio,31,2024,data_semester_2.total,0.431\n\
gini_ratio,31,2024,data_semester_2.perkotaan,0.431\n\
gini_ratio,32,2024,data_semester_2.total,0.425\n\
tingkat_pengangguran_terbuka,31,2024,data.agustus,6.21\n";

        let summary = SeedImporter::from_csv_reader(&store, Cursor::new(csv))
            .await
            .expect("import succeeds");

        assert_eq!(summary.rows, 4);
        assert_eq!(summary.records_touched, 3);
        assert_eq!(
            summary.collections.iter().map(String::as_str).collect::<Vec<_>>(),
            vec!["gini_ratio", "tingkat_pengangguran_terbuka"]
        );

        let record = store
            .find_one_by_province_and_year("gini_ratio", "31", 2024)
            .await
            .expect("query")
            .expect("record imported");
        assert_eq!(
            record.values.get("data_semester_2"),
            Some(&json!({ "total": 0.431, "perkotaan": 0.431 }))
        );
    }

    #[tokio::test]
    async fn csv_rows_extend_existing_records_and_keep_nulls() {
        let store = InMemoryIndicatorStore::new();
        store
            .upsert(
                "tingkat_pengangguran_terbuka",
                IndicatorRecord::new("31", 2024).with_number("data.februari", 6.03),
            )
            .await
            .expect("seed");

        let csv = "collection,province_id,tahun,field,value\n\
tingkat_pengangguran_terbuka,31,2024,data.agustus,\n";
        SeedImporter::from_csv_reader(&store, Cursor::new(csv))
            .await
            .expect("import succeeds");

        let record = store
            .find_one_by_province_and_year("tingkat_pengangguran_terbuka", "31", 2024)
            .await
            .expect("query")
            .expect("record exists");
        assert_eq!(
            record.values.get("data"),
            Some(&json!({ "februari": 6.03, "agustus": null }))
        );
    }

    #[tokio::test]
    async fn non_numeric_values_report_their_line() {
        let store = InMemoryIndicatorStore::new();
        let csv = "collection,province_id,tahun,field,value\n\
gini_ratio,31,2024,data_semester_2.total,0.431\n\
gini_ratio,32,2024,data_semester_2.total,n/a\n";

        let error = SeedImporter::from_csv_reader(&store, Cursor::new(csv))
            .await
            .expect_err("bad value rejected");
        match error {
            ImportError::InvalidRow { line, reason } => {
                assert_eq!(line, 3);
                assert!(reason.contains("n/a"));
            }
            other => panic!("expected row error, got {other:?}"),
        }
        assert!(store.is_empty(), "nothing is written when a row fails");
    }

    #[tokio::test]
    async fn json_snapshot_upserts_every_collection() {
        let store = InMemoryIndicatorStore::new();
        let snapshot = json!({
            "indeks_pembangunan_manusia": [
                { "province_id": "31", "tahun": 2024, "data": 83.55 },
                { "province_id": "94", "tahun": 2024, "data": 63.01 }
            ],
            "kependudukan": [
                { "province_id": "31", "tahun": 2024, "data": { "jumlah_penduduk_ribu": 10684.9 } }
            ]
        });

        let summary =
            SeedImporter::from_json_reader(&store, Cursor::new(snapshot.to_string()))
                .await
                .expect("snapshot loads");

        assert_eq!(summary.records_touched, 3);
        assert_eq!(store.len(), 3);
    }

    #[tokio::test]
    async fn from_path_propagates_io_errors() {
        let store = InMemoryIndicatorStore::new();
        let error = SeedImporter::from_path(&store, "./does-not-exist.csv")
            .await
            .expect_err("expected io error");
        assert!(matches!(error, ImportError::Io(_)));
    }
}
