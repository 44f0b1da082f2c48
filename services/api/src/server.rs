use crate::cli::ServeArgs;
use crate::infra::{AppState, SimulationCache};
use crate::routes::simulation_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use impact_sim::config::AppConfig;
use impact_sim::error::AppError;
use impact_sim::simulation::SimulationService;
use impact_sim::telemetry;
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

    let service = Arc::new(SimulationService::from_config(&config.simulation)?);
    info!(
        regions = service.regions().regions().len(),
        interventions = service.interventions().interventions().len(),
        strictness = ?config.simulation.strictness,
        cache_capacity = config.simulation.cache_capacity,
        "simulation catalogs loaded"
    );

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        service,
        cache: Arc::new(SimulationCache::new(config.simulation.cache_capacity)),
    };

    let app = simulation_routes()
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "impact simulator ready");

    axum::serve(listener, app).await?;
    Ok(())
}
