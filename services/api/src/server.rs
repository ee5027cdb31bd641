use crate::cli::ServeArgs;
use crate::infra::{AppState, SimulatedVerificationGateway};
use crate::routes::with_origination_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use loan_origination::config::AppConfig;
use loan_origination::error::AppError;
use loan_origination::origination::{Authenticator, LoanOriginationService, MemoryLoanStore};
use loan_origination::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
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

    let authenticator = Arc::new(Authenticator::from_config(&config.auth));
    if authenticator.is_empty() {
        warn!("APP_API_TOKENS is empty; every origination request will be rejected");
    }

    let store = Arc::new(MemoryLoanStore::new());
    let gateway = Arc::new(SimulatedVerificationGateway);
    let service = Arc::new(LoanOriginationService::new(
        store,
        gateway,
        config.workflow.assumptions.clone(),
        config.workflow.transition_mode,
    ));

    let app = with_origination_routes(service, authenticator)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        transition_mode = ?config.workflow.transition_mode,
        "loan origination service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
