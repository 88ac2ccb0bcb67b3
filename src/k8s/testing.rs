//! In-memory [`ClusterApi`] used by unit tests.

use crate::k8s::{ClusterApi, Workload, WorkloadKind};
use crate::{Result, UpdaterError};
use async_trait::async_trait;
use k8s_openapi::api::apps::v1::{DaemonSet, DaemonSetSpec, Deployment, DeploymentSpec};
use k8s_openapi::api::core::v1::{ConfigMap, PodTemplateSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use std::collections::BTreeMap;
use std::sync::Mutex;

const NAMESPACE: &str = "mw-agent-ns";

#[derive(Default)]
struct State {
    config_maps: BTreeMap<String, ConfigMap>,
    workloads: BTreeMap<(WorkloadKind, String), Workload>,
    config_map_writes: Vec<String>,
    workload_writes: Vec<(WorkloadKind, String)>,
    conflict_next_write: bool,
}

/// Stores objects by name and enforces `resourceVersion` on replace.
#[derive(Default)]
pub struct FakeCluster {
    state: Mutex<State>,
}

fn meta(name: &str) -> ObjectMeta {
    ObjectMeta {
        name: Some(name.to_string()),
        namespace: Some(NAMESPACE.to_string()),
        resource_version: Some("1".to_string()),
        ..Default::default()
    }
}

fn template(labels: &[(&str, &str)]) -> PodTemplateSpec {
    PodTemplateSpec {
        metadata: Some(ObjectMeta {
            labels: Some(
                labels
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            ),
            ..Default::default()
        }),
        spec: None,
    }
}

fn bump(version: &Option<String>) -> Option<String> {
    let current: u64 = version.as_deref().and_then(|v| v.parse().ok()).unwrap_or(0);
    Some((current + 1).to_string())
}

fn conflict(kind: &'static str, name: &str) -> UpdaterError {
    UpdaterError::Conflict {
        kind,
        name: name.to_string(),
        namespace: NAMESPACE.to_string(),
    }
}

fn not_found(kind: &'static str, name: &str) -> UpdaterError {
    UpdaterError::NotFound {
        kind,
        name: name.to_string(),
        namespace: NAMESPACE.to_string(),
    }
}

fn workload_meta(workload: &Workload) -> &ObjectMeta {
    match workload {
        Workload::DaemonSet(ds) => &ds.metadata,
        Workload::Deployment(d) => &d.metadata,
    }
}

impl FakeCluster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed_config_map(&self, name: &str, data: &[(&str, &str)]) {
        let config_map = ConfigMap {
            metadata: meta(name),
            data: (!data.is_empty()).then(|| {
                data.iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect()
            }),
            ..Default::default()
        };
        self.state
            .lock()
            .unwrap()
            .config_maps
            .insert(name.to_string(), config_map);
    }

    pub fn seed_workload(&self, kind: WorkloadKind, name: &str, labels: &[(&str, &str)]) {
        let workload = match kind {
            WorkloadKind::DaemonSet => Workload::DaemonSet(Box::new(DaemonSet {
                metadata: meta(name),
                spec: Some(DaemonSetSpec {
                    template: template(labels),
                    ..Default::default()
                }),
                status: None,
            })),
            WorkloadKind::Deployment => Workload::Deployment(Box::new(Deployment {
                metadata: meta(name),
                spec: Some(DeploymentSpec {
                    template: template(labels),
                    ..Default::default()
                }),
                status: None,
            })),
        };
        self.state
            .lock()
            .unwrap()
            .workloads
            .insert((kind, name.to_string()), workload);
    }

    pub fn fail_next_write_with_conflict(&self) {
        self.state.lock().unwrap().conflict_next_write = true;
    }

    pub fn config_map_data(&self, name: &str) -> BTreeMap<String, String> {
        self.state.lock().unwrap().config_maps[name]
            .data
            .clone()
            .unwrap_or_default()
    }

    pub fn template_label(&self, kind: WorkloadKind, name: &str, key: &str) -> Option<String> {
        self.state
            .lock()
            .unwrap()
            .workloads
            .get(&(kind, name.to_string()))
            .and_then(|w| w.template_labels().and_then(|l| l.get(key).cloned()))
    }

    pub fn config_map_writes(&self) -> Vec<String> {
        self.state.lock().unwrap().config_map_writes.clone()
    }

    pub fn workload_writes(&self) -> Vec<(WorkloadKind, String)> {
        self.state.lock().unwrap().workload_writes.clone()
    }
}

#[async_trait]
impl ClusterApi for FakeCluster {
    async fn get_config_map(&self, name: &str) -> Result<ConfigMap> {
        self.state
            .lock()
            .unwrap()
            .config_maps
            .get(name)
            .cloned()
            .ok_or_else(|| not_found("ConfigMap", name))
    }

    async fn replace_config_map(&self, config_map: &ConfigMap) -> Result<ConfigMap> {
        let name = config_map.metadata.name.clone().unwrap_or_default();
        let mut state = self.state.lock().unwrap();

        if std::mem::take(&mut state.conflict_next_write) {
            return Err(conflict("ConfigMap", &name));
        }
        let stored = state
            .config_maps
            .get(&name)
            .ok_or_else(|| not_found("ConfigMap", &name))?;
        if stored.metadata.resource_version != config_map.metadata.resource_version {
            return Err(conflict("ConfigMap", &name));
        }

        let mut updated = config_map.clone();
        updated.metadata.resource_version = bump(&stored.metadata.resource_version);
        state.config_maps.insert(name.clone(), updated.clone());
        state.config_map_writes.push(name);
        Ok(updated)
    }

    async fn get_workload(&self, kind: WorkloadKind, name: &str) -> Result<Workload> {
        self.state
            .lock()
            .unwrap()
            .workloads
            .get(&(kind, name.to_string()))
            .cloned()
            .ok_or_else(|| not_found(kind.object_kind(), name))
    }

    async fn replace_workload(&self, workload: &Workload) -> Result<Workload> {
        let kind = workload.kind();
        let name = workload.name().unwrap_or_default().to_string();
        let mut state = self.state.lock().unwrap();

        if std::mem::take(&mut state.conflict_next_write) {
            return Err(conflict(kind.object_kind(), &name));
        }
        let stored = state
            .workloads
            .get(&(kind, name.clone()))
            .ok_or_else(|| not_found(kind.object_kind(), &name))?;
        let stored_version = workload_meta(stored).resource_version.clone();
        if stored_version != workload_meta(workload).resource_version {
            return Err(conflict(kind.object_kind(), &name));
        }

        let mut updated = workload.clone();
        let version = bump(&stored_version);
        match &mut updated {
            Workload::DaemonSet(ds) => ds.metadata.resource_version = version,
            Workload::Deployment(d) => d.metadata.resource_version = version,
        }
        state.workloads.insert((kind, name.clone()), updated.clone());
        state.workload_writes.push((kind, name));
        Ok(updated)
    }
}
