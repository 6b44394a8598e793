use metrics_exporter_prometheus::PrometheusHandle;
use regional_gap::error::AppError;
use regional_gap::store::{InMemoryIndicatorStore, SeedImporter};
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// In-memory store, seeded from `seed_path` when one is configured.
pub(crate) async fn build_store(
    seed_path: Option<&Path>,
) -> Result<Arc<InMemoryIndicatorStore>, AppError> {
    let store = InMemoryIndicatorStore::new();

    match seed_path {
        Some(path) => {
            SeedImporter::from_path(&store, path).await?;
        }
        None => info!("APP_DATA_PATH unset; starting with an empty indicator store"),
    }

    Ok(Arc::new(store))
}
