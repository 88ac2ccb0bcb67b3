use crate::config::WorkloadTargets;
use crate::k8s::{ClusterApi, WorkloadKind};
use crate::Result;
use k8s_openapi::chrono::Utc;
use std::sync::Arc;
use tracing::info;

/// Pod template label bumped to force a rolling restart.
pub const TIMESTAMP_LABEL: &str = "timestamp";

/// Forces the cluster to recreate a workload's pods by changing a label on
/// its pod template. Completion of the rollout is left to the cluster.
pub struct RolloutTrigger {
    cluster: Arc<dyn ClusterApi>,
    targets: WorkloadTargets,
}

impl RolloutTrigger {
    pub fn new(cluster: Arc<dyn ClusterApi>, targets: WorkloadTargets) -> Self {
        Self { cluster, targets }
    }

    /// Sets the `timestamp` label to the current Unix time and writes the
    /// workload back. Returns the label value written.
    pub async fn trigger_rollout(&self, kind: WorkloadKind) -> Result<i64> {
        let name = self.targets.workload_name(kind);
        let mut workload = self.cluster.get_workload(kind, name).await?;

        let previous = workload
            .template_labels()
            .and_then(|labels| labels.get(TIMESTAMP_LABEL))
            .and_then(|value| value.parse::<i64>().ok());
        let stamp = next_timestamp(Utc::now().timestamp(), previous);

        workload
            .template_labels_mut()
            .insert(TIMESTAMP_LABEL.to_string(), stamp.to_string());

        self.cluster.replace_workload(&workload).await?;

        info!(
            kind = %kind,
            name,
            namespace = %self.targets.namespace,
            timestamp = stamp,
            "rollout restart triggered"
        );

        Ok(stamp)
    }
}

/// The label must differ from the last one written, even when two triggers
/// land within the same second. A label at `i64::MAX` cannot be bumped and
/// is replaced by the current time.
fn next_timestamp(now: i64, previous: Option<i64>) -> i64 {
    match previous {
        Some(prev) if prev >= now => prev.checked_add(1).unwrap_or(now),
        _ => now,
    }
}
