use crate::cli::ServeArgs;
use crate::infra::{build_service, load_ledger, resolve_ledger_source, AppState};
use crate::routes::with_eligibility_routes;
use axum::{Extension, Router};
use axum_prometheus::PrometheusMetricLayer;
use eduledger::config::AppConfig;
use eduledger::error::AppError;
use eduledger::telemetry;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(args: ServeArgs) -> Result<(), AppError> {
    let ServeArgs { host, port, ledger } = args;

    let mut config = AppConfig::load()?;
    config.server.host = host.unwrap_or(config.server.host);
    config.server.port = port.unwrap_or(config.server.port);
    telemetry::init(&config.telemetry)?;

    let source = resolve_ledger_source(&ledger, &config);
    let service = build_service(&config, Arc::new(load_ledger(&source)?));

    let ready = Arc::new(AtomicBool::new(false));
    let app = instrumented_app(with_eligibility_routes(service), ready.clone());

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    ready.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        ledger = %source,
        timeout_secs = config.eligibility.advisory_timeout.as_secs(),
        currency = %config.eligibility.currency,
        "eligibility estimator listening"
    );

    axum::serve(listener, app).await?;
    Ok(())
}

/// Attaches request metrics and the shared state read by `/health`, `/ready` and `/metrics`.
fn instrumented_app(router: Router, ready: Arc<AtomicBool>) -> Router {
    let (metric_layer, metric_handle) = PrometheusMetricLayer::pair();
    router
        .layer(Extension(AppState {
            readiness: ready,
            metrics: Arc::new(metric_handle),
        }))
        .layer(metric_layer)
}
