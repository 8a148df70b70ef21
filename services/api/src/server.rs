use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryGateway};
use crate::routes::with_assignment_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use team_placement::config::AppConfig;
use team_placement::error::AppError;
use team_placement::telemetry;
use team_placement::workflows::assignment::AssignmentService;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    if !config.roster.is_configured() {
        warn!("no roster exports configured; starting with an empty team directory");
    }
    let gateway = InMemoryGateway::from_config(&config.roster)?;
    let assignment_service = Arc::new(AssignmentService::new(Arc::new(gateway.clone())));

    let app = with_assignment_routes(assignment_service, gateway)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "team placement service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
