//! Writes fetched pipeline configuration into the per-kind ConfigMaps.

use crate::backend::ConfigBlob;
use crate::config::WorkloadTargets;
use crate::k8s::{ClusterApi, WorkloadKind};
use crate::Result;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

/// ConfigMap key holding the serialized collector configuration.
pub const OTEL_CONFIG_KEY: &str = "otel-config";

pub struct ConfigStoreWriter {
    cluster: Arc<dyn ClusterApi>,
    targets: WorkloadTargets,
}

impl ConfigStoreWriter {
    pub fn new(cluster: Arc<dyn ClusterApi>, targets: WorkloadTargets) -> Self {
        Self { cluster, targets }
    }

    /// Replaces the `otel-config` entry of the ConfigMap for `kind` with the
    /// YAML form of `blob`. Other keys are written back untouched, and the
    /// write is rejected if the ConfigMap changed since it was read.
    pub async fn update_config(&self, kind: WorkloadKind, blob: &ConfigBlob) -> Result<()> {
        let yaml = serde_yaml::to_string(blob)?;
        let name = self.targets.config_map_name(kind);

        let mut config_map = self.cluster.get_config_map(name).await?;
        config_map
            .data
            .get_or_insert_with(BTreeMap::new)
            .insert(OTEL_CONFIG_KEY.to_string(), yaml);

        let updated = self.cluster.replace_config_map(&config_map).await?;

        info!(
            kind = %kind,
            configmap = updated.metadata.name.as_deref().unwrap_or(name),
            namespace = %self.targets.namespace,
            "ConfigMap updated successfully"
        );

        Ok(())
    }
}
