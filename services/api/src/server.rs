use crate::cli::ServeArgs;
use crate::infra::{load_store, AppState};
use crate::routes::with_budget_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use fund_quota::config::AppConfig;
use fund_quota::error::AppError;
use fund_quota::telemetry;
use fund_quota::workflows::budget::BudgetQuotaService;
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

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let store = Arc::new(load_store(&config.quota, args.snapshot_dir.take())?);
    let quota_service = Arc::new(BudgetQuotaService::new(store, config.quota.policy));

    let app = with_budget_routes(quota_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        mapping_mode = ?config.quota.policy.mapping_mode,
        "fund quota service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
