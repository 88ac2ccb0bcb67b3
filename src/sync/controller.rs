//! Periodic check-then-fetch loop that keeps the agent's ConfigMaps in sync
//! with the backend and restarts the affected workloads.
//!
//! Each cycle asks the backend which workload kinds changed, then for every
//! flagged kind runs `fetch_config -> update_config -> trigger_rollout`. The
//! kinds run concurrently and fail independently; a failed step is logged and
//! retried on the next tick, never within the same cycle.

use crate::backend::ConfigBackend;
use crate::k8s::{ConfigStoreWriter, RolloutTrigger, WorkloadKind};
use crate::sync::state::{CheckOutcome, CycleReport, KindOutcome, Operation, SyncState};
use crate::UpdaterError;
use futures::future::join_all;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

pub struct SyncController {
    backend: Arc<dyn ConfigBackend>,
    store: ConfigStoreWriter,
    rollout: RolloutTrigger,
    poll_interval: Option<Duration>,
    state: Mutex<SyncState>,
}

impl SyncController {
    /// `poll_interval` of `None` disables polling: [`run`](Self::run) returns
    /// without contacting the backend.
    pub fn new(
        backend: Arc<dyn ConfigBackend>,
        store: ConfigStoreWriter,
        rollout: RolloutTrigger,
        poll_interval: Option<Duration>,
    ) -> Self {
        Self {
            backend,
            store,
            rollout,
            poll_interval,
            state: Mutex::new(SyncState::Idle),
        }
    }

    pub fn state(&self) -> SyncState {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn set_state(&self, state: SyncState) {
        *self.state.lock().unwrap_or_else(|e| e.into_inner()) = state;
    }

    /// Polls until `cancel` fires. The first cycle starts immediately. A
    /// cycle that outlasts the interval absorbs the missed ticks rather than
    /// letting cycles overlap or queue up. Cancellation is observed between
    /// cycles and before each call, never in the middle of one.
    pub async fn run(&self, cancel: CancellationToken) {
        let Some(period) = self.poll_interval else {
            info!("config check interval is 0, polling for config changes disabled");
            return;
        };

        info!(interval = ?period, "listening for config changes");

        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }

            let report = self.run_cycle(&cancel).await;
            debug!(?report, "config check cycle finished");
        }

        self.set_state(SyncState::Stopped);
        info!("stopped listening for config changes");
    }

    /// One check-and-apply cycle.
    pub async fn run_cycle(&self, cancel: &CancellationToken) -> CycleReport {
        if cancel.is_cancelled() {
            return CycleReport::new(CheckOutcome::NotRun);
        }

        self.set_state(SyncState::Polling);

        let status = match self.backend.check_restart_status().await {
            Ok(status) => status,
            Err(e) => {
                error!(
                    operation = Operation::CheckRestartStatus.as_str(),
                    error = %e,
                    "failed to check restart status"
                );
                self.set_state(SyncState::Idle);
                return CycleReport::new(CheckOutcome::Failed {
                    error: e.to_string(),
                });
            }
        };

        if !status.status {
            warn!(
                operation = Operation::CheckRestartStatus.as_str(),
                message = %status.message,
                "backend reported failure status for restart check"
            );
            self.set_state(SyncState::Idle);
            return CycleReport::new(CheckOutcome::Rejected {
                message: status.message,
            });
        }

        let kinds = status.flagged_kinds();
        if kinds.is_empty() {
            debug!("no configuration changes");
        }

        let report = self.apply(CheckOutcome::Ok, &kinds, cancel).await;
        self.set_state(SyncState::Idle);
        report
    }

    /// Runs the pipeline for both kinds without asking the backend whether
    /// anything changed.
    pub async fn force_update(&self, cancel: &CancellationToken) -> CycleReport {
        info!("forcing configuration update for all workloads");
        let report = self
            .apply(CheckOutcome::NotRun, &WorkloadKind::ALL, cancel)
            .await;
        self.set_state(SyncState::Idle);
        report
    }

    async fn apply(
        &self,
        check: CheckOutcome,
        kinds: &[WorkloadKind],
        cancel: &CancellationToken,
    ) -> CycleReport {
        let mut report = CycleReport::new(check);
        if kinds.is_empty() {
            return report;
        }

        self.set_state(SyncState::Applying);

        let outcomes = join_all(kinds.iter().map(|kind| async move {
            (*kind, self.apply_kind(*kind, cancel).await)
        }))
        .await;

        for (kind, outcome) in outcomes {
            report.set_outcome(kind, outcome);
        }
        report
    }

    async fn apply_kind(&self, kind: WorkloadKind, cancel: &CancellationToken) -> KindOutcome {
        info!(kind = %kind, "configuration changed, updating workload");

        match self.pipeline(kind, cancel).await {
            Ok(timestamp) => KindOutcome::Applied { timestamp },
            Err((operation, UpdaterError::Cancelled)) => {
                info!(kind = %kind, operation = operation.as_str(), "update cancelled");
                KindOutcome::Cancelled { operation }
            }
            Err((operation, e)) => {
                error!(
                    kind = %kind,
                    operation = operation.as_str(),
                    error = %e,
                    "workload update failed, will retry on next check"
                );
                KindOutcome::Failed {
                    operation,
                    error: e.to_string(),
                }
            }
        }
    }

    /// Config must land before the rollout, so a restart never picks up a
    /// stale ConfigMap.
    async fn pipeline(
        &self,
        kind: WorkloadKind,
        cancel: &CancellationToken,
    ) -> Result<i64, (Operation, UpdaterError)> {
        let step = |operation: Operation| {
            if cancel.is_cancelled() {
                Err((operation, UpdaterError::Cancelled))
            } else {
                Ok(())
            }
        };

        step(Operation::FetchConfig)?;
        let blob = self
            .backend
            .fetch_config(kind)
            .await
            .map_err(|e| (Operation::FetchConfig, e))?;

        step(Operation::UpdateConfig)?;
        self.store
            .update_config(kind, &blob)
            .await
            .map_err(|e| (Operation::UpdateConfig, e))?;

        step(Operation::TriggerRollout)?;
        self.rollout
            .trigger_rollout(kind)
            .await
            .map_err(|e| (Operation::TriggerRollout, e))
    }
}
