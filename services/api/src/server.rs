use crate::cli::ServeArgs;
use crate::infra::{build_store, AppState};
use crate::routes::with_dashboard_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use regional_gap::analysis::UnemploymentAnalysisService;
use regional_gap::config::AppConfig;
use regional_gap::error::AppError;
use regional_gap::indicators::{BpsProvinceDirectory, IndicatorRegistry, IndicatorState};
use regional_gap::scoring::YearScoringService;
use regional_gap::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let registry = Arc::new(IndicatorRegistry::bps_default()?);
    let provinces = Arc::new(BpsProvinceDirectory);
    let store = build_store(config.data.seed_path.as_deref()).await?;

    let scoring = Arc::new(YearScoringService::new(
        store.clone(),
        provinces.clone(),
        registry.clone(),
    ));
    let analysis = Arc::new(UnemploymentAnalysisService::new(
        store.clone(),
        provinces,
    )?);
    let indicators = IndicatorState {
        store: store.clone(),
        registry: registry.clone(),
    };

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let app = with_dashboard_routes(scoring, analysis, indicators)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        collections = registry.len(),
        records = store.len(),
        "regional gap dashboard ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
