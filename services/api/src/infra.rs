use fund_quota::config::QuotaConfig;
use fund_quota::error::AppError;
use fund_quota::workflows::snapshot::SnapshotStore;
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Load the record snapshot, preferring an explicit directory over the configured one.
///
/// Without any directory the store starts empty so the service can still answer
/// health checks.
pub(crate) fn load_store(
    config: &QuotaConfig,
    override_dir: Option<PathBuf>,
) -> Result<SnapshotStore, AppError> {
    match override_dir.or_else(|| config.snapshot_dir.clone()) {
        Some(dir) => {
            let store = SnapshotStore::from_dir(&dir)?;
            let snapshot = store.snapshot();
            info!(
                dir = %dir.display(),
                budgets = snapshot.budgets.len(),
                rates = snapshot.reward_rates.len(),
                submissions = snapshot.submissions.len(),
                "loaded budget snapshot"
            );
            Ok(store)
        }
        None => {
            warn!("no snapshot directory configured; serving an empty budget store");
            Ok(SnapshotStore::default())
        }
    }
}
