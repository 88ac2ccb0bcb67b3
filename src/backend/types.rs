use crate::k8s::WorkloadKind;
use serde::{Deserialize, Serialize};

/// Opaque pipeline configuration served by the backend for one workload kind.
pub type ConfigBlob = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RolloutFlags {
    #[serde(default)]
    pub deployment: bool,
    #[serde(default)]
    pub daemonset: bool,
}

/// Body of `GET /api/v1/agent/restart-status/{key}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestartStatusResponse {
    #[serde(default)]
    pub status: bool,
    #[serde(default)]
    pub restart: bool,
    #[serde(default)]
    pub rollout: RolloutFlags,
    #[serde(default)]
    pub message: String,
}

impl RestartStatusResponse {
    pub fn should_rollout(&self, kind: WorkloadKind) -> bool {
        match kind {
            WorkloadKind::DaemonSet => self.rollout.daemonset,
            WorkloadKind::Deployment => self.rollout.deployment,
        }
    }

    /// Kinds flagged for rollout, in a fixed order.
    pub fn flagged_kinds(&self) -> Vec<WorkloadKind> {
        WorkloadKind::ALL
            .into_iter()
            .filter(|kind| self.should_rollout(*kind))
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigPayload {
    #[serde(default)]
    pub daemonset: Option<ConfigBlob>,
    #[serde(default)]
    pub deployment: Option<ConfigBlob>,
    #[serde(default)]
    pub docker: Option<ConfigBlob>,
    #[serde(default)]
    pub nodocker: Option<ConfigBlob>,
}

impl ConfigPayload {
    /// The blob for `kind`, or `None` when the backend sent nothing usable.
    pub fn for_kind(&self, kind: WorkloadKind) -> Option<&ConfigBlob> {
        let blob = match kind {
            WorkloadKind::DaemonSet => self.daemonset.as_ref(),
            WorkloadKind::Deployment => self.deployment.as_ref(),
        };
        blob.filter(|b| !b.is_empty())
    }
}

/// Body of `GET /api/v1/agent/ingestion-rules/{key}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigResponse {
    #[serde(default)]
    pub status: bool,
    #[serde(default)]
    pub config: ConfigPayload,
    #[serde(default)]
    pub message: String,
}
