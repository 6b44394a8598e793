//! Indicator records, province codes, the collection registry and the CRUD routes.

pub mod province;
pub mod record;
pub mod registry;
pub mod router;

pub use province::{
    BpsProvinceDirectory, InvalidProvinceId, ProvinceDirectory, ProvinceId, UNKNOWN_PROVINCE,
};
pub use record::{FieldPath, FieldPathError, FieldValue, IndicatorRecord};
pub use registry::{
    CollectionConfig, CollectionSpec, IndicatorRegistry, RegistryError, POPULATION_COLLECTION,
    POPULATION_FIELD,
};
pub use router::{indicator_router, IndicatorState};
