use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Probe the table store and report `ok` or `degraded`.
///
/// A failed probe only logs: the storage supervisor owns degraded mode transitions.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    let reachable = match state.require_store().await {
        Ok(store) => match store.health_check().await {
            Ok(()) => true,
            Err(err) => {
                warn!(error = %err, "storage health check failed");
                false
            }
        },
        Err(_) => {
            warn!("storage unavailable (degraded mode)");
            false
        }
    };

    HealthResponse::from_probe(reachable && !state.is_degraded().await)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{config::AppConfig, dao::table_store::memory::MemoryStore, state::AppState};

    #[tokio::test]
    async fn reports_degraded_until_storage_is_installed() {
        let state = AppState::new(AppConfig::default());
        let report = health_status(&state).await;
        assert_eq!(report.status, "degraded");
        assert!(!report.storage_reachable);

        state.set_store(Arc::new(MemoryStore::new())).await;
        let report = health_status(&state).await;
        assert_eq!(report.status, "ok");
        assert!(report.storage_reachable);

        state.clear_store().await;
        assert_eq!(health_status(&state).await.status, "degraded");
    }
}
