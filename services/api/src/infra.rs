use crate::cli::LedgerArgs;
use eduledger::config::AppConfig;
use eduledger::error::AppError;
use eduledger::workflows::eligibility::EligibilityService;
use eduledger::workflows::fixture::{InMemoryLedger, LedgerSnapshot};
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Where the in-memory ledger was loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum LedgerSource {
    Fixture(PathBuf),
    BundledSample,
}

impl std::fmt::Display for LedgerSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LedgerSource::Fixture(path) => write!(f, "fixture {}", path.display()),
            LedgerSource::BundledSample => f.write_str("bundled sample ledger"),
        }
    }
}

/// Command-line path wins over `LEDGER_FIXTURE`; with neither, the bundled sample is used.
pub(crate) fn resolve_ledger_source(args: &LedgerArgs, config: &AppConfig) -> LedgerSource {
    args.fixture
        .clone()
        .or_else(|| config.ledger.fixture.clone())
        .map(LedgerSource::Fixture)
        .unwrap_or(LedgerSource::BundledSample)
}

pub(crate) fn load_ledger(source: &LedgerSource) -> Result<InMemoryLedger, AppError> {
    let snapshot = match source {
        LedgerSource::Fixture(path) => LedgerSnapshot::from_path(path)?,
        LedgerSource::BundledSample => LedgerSnapshot::sample()?,
    };
    let ledger = InMemoryLedger::from_snapshot(snapshot);
    info!(source = %source, students = ledger.len(), "ledger loaded");
    Ok(ledger)
}

pub(crate) fn build_service(
    config: &AppConfig,
    ledger: Arc<InMemoryLedger>,
) -> Arc<EligibilityService<InMemoryLedger>> {
    Arc::new(EligibilityService::with_settings(
        ledger,
        config.eligibility.evaluation(),
        config.eligibility.settings(),
    ))
}
