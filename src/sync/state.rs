use crate::k8s::WorkloadKind;

/// Lifecycle of the sync controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Idle,
    Polling,
    Applying,
    Stopped,
}

impl SyncState {
    pub const fn as_str(&self) -> &'static str {
        match self {
            SyncState::Idle => "idle",
            SyncState::Polling => "polling",
            SyncState::Applying => "applying",
            SyncState::Stopped => "stopped",
        }
    }
}

impl std::fmt::Display for SyncState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Step of a workload pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    CheckRestartStatus,
    FetchConfig,
    UpdateConfig,
    TriggerRollout,
}

impl Operation {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Operation::CheckRestartStatus => "check_restart_status",
            Operation::FetchConfig => "fetch_config",
            Operation::UpdateConfig => "update_config",
            Operation::TriggerRollout => "trigger_rollout",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What happened to one workload kind during a cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KindOutcome {
    /// Not flagged by the backend, or the cycle never got that far.
    Skipped,
    /// Config written and rollout triggered with this label value.
    Applied { timestamp: i64 },
    Failed { operation: Operation, error: String },
    Cancelled { operation: Operation },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    /// The restart-status call was not made.
    NotRun,
    Ok,
    /// The backend answered with `status: false`.
    Rejected { message: String },
    Failed { error: String },
}

/// Summary of one poll cycle or forced update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    pub check: CheckOutcome,
    pub daemonset: KindOutcome,
    pub deployment: KindOutcome,
}

impl CycleReport {
    pub fn new(check: CheckOutcome) -> Self {
        Self {
            check,
            daemonset: KindOutcome::Skipped,
            deployment: KindOutcome::Skipped,
        }
    }

    pub fn outcome(&self, kind: WorkloadKind) -> &KindOutcome {
        match kind {
            WorkloadKind::DaemonSet => &self.daemonset,
            WorkloadKind::Deployment => &self.deployment,
        }
    }

    pub fn set_outcome(&mut self, kind: WorkloadKind, outcome: KindOutcome) {
        match kind {
            WorkloadKind::DaemonSet => self.daemonset = outcome,
            WorkloadKind::Deployment => self.deployment = outcome,
        }
    }

    pub fn applied(&self) -> usize {
        WorkloadKind::ALL
            .iter()
            .filter(|kind| matches!(self.outcome(**kind), KindOutcome::Applied { .. }))
            .count()
    }
}
