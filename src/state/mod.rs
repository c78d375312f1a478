pub mod board;
pub mod kits;
pub mod session;
mod sse;
pub mod tournament;

use std::{future::Future, sync::Arc};

use tokio::sync::{RwLock, watch};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    config::AppConfig,
    dao::{
        models::{EnrollmentEntity, EnrollmentPatch},
        repository::Repository,
        table_store::TableStore,
    },
    dto::sse::{ServerEvent, SystemStatus},
    error::ServiceError,
    services::sse_events::EVENT_SYSTEM_STATUS,
};

pub use self::sse::SseHub;
use self::board::BoardLedger;

pub type SharedState = Arc<AppState>;

const PUBLIC_SSE_CAPACITY: usize = 64;

/// Central application state: storage handle, SSE hub and cached boards.
pub struct AppState {
    store: RwLock<Option<Arc<dyn TableStore>>>,
    sse: SseHub,
    boards: BoardLedger,
    config: Arc<AppConfig>,
    degraded: watch::Sender<bool>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts in degraded mode until a storage backend is installed.
    pub fn new(config: AppConfig) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        Arc::new(Self {
            store: RwLock::new(None),
            sse: SseHub::new(PUBLIC_SSE_CAPACITY),
            boards: BoardLedger::new(),
            config: Arc::new(config),
            degraded: degraded_tx,
        })
    }

    /// Construct a state that already has a healthy store installed.
    pub async fn with_store(config: AppConfig, store: Arc<dyn TableStore>) -> SharedState {
        let state = Self::new(config);
        state.set_store(store).await;
        state
    }

    /// Obtain a handle to the current store, if one is installed.
    pub async fn table_store(&self) -> Option<Arc<dyn TableStore>> {
        let guard = self.store.read().await;
        guard.as_ref().cloned()
    }

    /// Current store, or [`ServiceError::Degraded`] while storage is unhealthy.
    pub async fn require_store(&self) -> Result<Arc<dyn TableStore>, ServiceError> {
        if self.is_degraded().await {
            return Err(ServiceError::Degraded);
        }
        self.table_store().await.ok_or(ServiceError::Degraded)
    }

    /// Typed repository over the current store.
    pub async fn repository(&self) -> Result<Repository, ServiceError> {
        Ok(Repository::new(self.require_store().await?))
    }

    /// Install a new store implementation and leave degraded mode.
    pub async fn set_store(&self, store: Arc<dyn TableStore>) {
        {
            let mut guard = self.store.write().await;
            *guard = Some(store);
        }
        self.update_degraded(false).await;
    }

    /// Remove the current store and enter degraded mode.
    pub async fn clear_store(&self) {
        {
            let mut guard = self.store.write().await;
            guard.take();
        }
        self.update_degraded(true).await;
    }

    /// Current degraded flag.
    pub async fn is_degraded(&self) -> bool {
        *self.degraded.borrow()
    }

    /// Subscribe to degraded mode updates.
    pub fn degraded_watcher(&self) -> watch::Receiver<bool> {
        self.degraded.subscribe()
    }

    /// Update the degraded flag and announce it on the public stream when it changes.
    pub async fn update_degraded(&self, value: bool) {
        let changed = self.degraded.send_if_modified(|current| {
            if *current == value {
                false
            } else {
                *current = value;
                true
            }
        });
        if !changed {
            return;
        }

        match ServerEvent::json(
            Some(EVENT_SYSTEM_STATUS.to_string()),
            &SystemStatus { degraded: value },
        ) {
            Ok(event) => self.sse.broadcast(event),
            Err(err) => warn!(error = %err, "failed to serialize system status"),
        }
    }

    /// Broadcast hub used for the public SSE stream.
    pub fn public_sse(&self) -> &SseHub {
        &self.sse
    }

    /// Cached match boards.
    pub fn boards(&self) -> &BoardLedger {
        &self.boards
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Apply `patch` to the cached board, run `work` against the backend, then commit the
    /// confirmed row or restore the previous value.
    pub async fn run_optimistic<F, Fut>(
        &self,
        match_id: Uuid,
        enrollment_id: Uuid,
        patch: &EnrollmentPatch,
        work: F,
    ) -> Result<EnrollmentEntity, ServiceError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<EnrollmentEntity, ServiceError>>,
    {
        let plan = self.boards.plan(match_id, enrollment_id, patch)?;

        match work().await {
            Ok(confirmed) => {
                if let Err(commit_err) = self.boards.commit(match_id, plan.id, confirmed.clone()) {
                    warn!(
                        match_id = %match_id,
                        plan_id = %plan.id,
                        error = ?commit_err,
                        "failed to commit optimistic update"
                    );
                }
                Ok(confirmed)
            }
            Err(err) => {
                match self.boards.rollback(match_id, plan.id) {
                    Ok(_) => info!(
                        match_id = %match_id,
                        enrollment_id = %enrollment_id,
                        error = %err,
                        "rolled back optimistic update"
                    ),
                    Err(rollback_err) => warn!(
                        match_id = %match_id,
                        plan_id = %plan.id,
                        error = ?rollback_err,
                        "failed to roll back optimistic update"
                    ),
                }
                Err(err)
            }
        }
    }
}
