use super::record::{FieldPath, FieldPathError};
use std::collections::HashSet;

/// Stored but unscored collection holding population figures.
pub const POPULATION_COLLECTION: &str = "kependudukan";
/// Population in thousands inside [`POPULATION_COLLECTION`] records.
pub const POPULATION_FIELD: &str = "data.jumlah_penduduk_ribu";

/// Static declaration of one scored collection.
#[derive(Debug, Clone, Copy)]
pub struct CollectionSpec {
    pub collection: &'static str,
    pub field_path: &'static str,
    pub lower_is_better: bool,
    pub display_name: &'static str,
}

const BPS_COLLECTIONS: [CollectionSpec; 9] = [
    // Semester 2 (September); the annual split is not published.
    CollectionSpec {
        collection: "gini_ratio",
        field_path: "data_semester_2.total",
        lower_is_better: true,
        display_name: "Gini Ratio",
    },
    CollectionSpec {
        collection: "indeks_pembangunan_manusia",
        field_path: "data",
        lower_is_better: false,
        display_name: "Indeks Pembangunan Manusia",
    },
    CollectionSpec {
        collection: "tingkat_pengangguran_terbuka",
        field_path: "data.agustus",
        lower_is_better: true,
        display_name: "Tingkat Pengangguran Terbuka",
    },
    CollectionSpec {
        collection: "persentase_penduduk_miskin",
        field_path: "data_semester_2.total",
        lower_is_better: true,
        display_name: "Persentase Penduduk Miskin",
    },
    CollectionSpec {
        collection: "pdrb_per_kapita",
        field_path: "data_ribu_rp",
        lower_is_better: false,
        display_name: "PDRB Per Kapita",
    },
    CollectionSpec {
        collection: "rata_rata_upah",
        field_path: "sektor.total.agustus",
        lower_is_better: false,
        display_name: "Rata-rata Upah Bersih",
    },
    CollectionSpec {
        collection: "inflasi_tahunan",
        field_path: "data_bulanan.desember",
        lower_is_better: true,
        display_name: "Inflasi Tahunan",
    },
    CollectionSpec {
        collection: "indeks_harga_konsumen",
        field_path: "data_bulanan.desember",
        lower_is_better: true,
        display_name: "Indeks Harga Konsumen",
    },
    CollectionSpec {
        collection: "angkatan_kerja",
        field_path: "data_agustus.persentase_bekerja_ak",
        lower_is_better: false,
        display_name: "Angkatan Kerja (% Bekerja)",
    },
];

/// Validated configuration for one scored collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionConfig {
    pub collection: String,
    pub field_path: FieldPath,
    pub lower_is_better: bool,
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("indicator registry must declare at least one collection")]
    Empty,
    #[error("collection name must not be blank")]
    BlankCollection,
    #[error("collection '{collection}' has an invalid field path: {source}")]
    InvalidFieldPath {
        collection: String,
        source: FieldPathError,
    },
    #[error("collection '{0}' is declared more than once")]
    DuplicateCollection(String),
    #[error("display name '{0}' is used by more than one collection")]
    DuplicateDisplayName(String),
}

/// Read-only lookup of scored collections, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndicatorRegistry {
    configs: Vec<CollectionConfig>,
}

impl IndicatorRegistry {
    /// The nine BPS indicators scored by the dashboard.
    pub fn bps_default() -> Result<Self, RegistryError> {
        Self::from_specs(&BPS_COLLECTIONS)
    }

    pub fn from_specs(specs: &[CollectionSpec]) -> Result<Self, RegistryError> {
        if specs.is_empty() {
            return Err(RegistryError::Empty);
        }

        let mut collections = HashSet::new();
        let mut display_names = HashSet::new();
        let mut configs = Vec::with_capacity(specs.len());

        for spec in specs {
            let collection = spec.collection.trim();
            if collection.is_empty() {
                return Err(RegistryError::BlankCollection);
            }
            if !collections.insert(collection) {
                return Err(RegistryError::DuplicateCollection(collection.to_string()));
            }
            if !display_names.insert(spec.display_name) {
                return Err(RegistryError::DuplicateDisplayName(
                    spec.display_name.to_string(),
                ));
            }

            let field_path =
                FieldPath::parse(spec.field_path).map_err(|source| {
                    RegistryError::InvalidFieldPath {
                        collection: collection.to_string(),
                        source,
                    }
                })?;

            configs.push(CollectionConfig {
                collection: collection.to_string(),
                field_path,
                lower_is_better: spec.lower_is_better,
                display_name: spec.display_name.to_string(),
            });
        }

        Ok(Self { configs })
    }

    pub fn config_for(&self, collection: &str) -> Option<&CollectionConfig> {
        self.configs
            .iter()
            .find(|config| config.collection == collection)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CollectionConfig> {
        self.configs.iter()
    }

    pub fn len(&self) -> usize {
        self.configs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }

    /// Scored collections plus the population collection accept CRUD traffic.
    pub fn is_stored_collection(&self, collection: &str) -> bool {
        collection == POPULATION_COLLECTION || self.config_for(collection).is_some()
    }
}
