use crate::k8s::types::{Workload, WorkloadKind};
use crate::{Result, UpdaterError};
use async_trait::async_trait;
use k8s_openapi::api::apps::v1::{DaemonSet, Deployment};
use k8s_openapi::api::core::v1::ConfigMap;
use kube::api::PostParams;
use kube::{Api, Client};
use tracing::{debug, info};

/// The slice of the cluster API the updater needs. Writes are full replaces
/// that carry the object's `resourceVersion`, so a concurrent change makes
/// them fail with [`UpdaterError::Conflict`] instead of overwriting it.
#[async_trait]
pub trait ClusterApi: Send + Sync {
    async fn get_config_map(&self, name: &str) -> Result<ConfigMap>;

    async fn replace_config_map(&self, config_map: &ConfigMap) -> Result<ConfigMap>;

    async fn get_workload(&self, kind: WorkloadKind, name: &str) -> Result<Workload>;

    async fn replace_workload(&self, workload: &Workload) -> Result<Workload>;
}

/// Kubernetes client scoped to the agent's namespace.
pub struct K8sClient {
    client: Client,
    namespace: String,
}

impl K8sClient {
    /// Builds a client from in-cluster credentials or the local kubeconfig.
    pub async fn try_default(namespace: impl Into<String>) -> Result<Self> {
        debug!("Initializing Kubernetes client");

        let client = Client::try_default().await.map_err(|e| {
            UpdaterError::Kubernetes(format!("Failed to create K8s client: {}", e))
        })?;

        info!("Successfully connected to Kubernetes cluster");

        Ok(Self::new(client, namespace))
    }

    pub fn new(client: Client, namespace: impl Into<String>) -> Self {
        Self {
            client,
            namespace: namespace.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    fn config_maps(&self) -> Api<ConfigMap> {
        Api::namespaced(self.client.clone(), &self.namespace)
    }

    fn daemon_sets(&self) -> Api<DaemonSet> {
        Api::namespaced(self.client.clone(), &self.namespace)
    }

    fn deployments(&self) -> Api<Deployment> {
        Api::namespaced(self.client.clone(), &self.namespace)
    }

    fn map_error(&self, kind: &'static str, name: &str, err: kube::Error) -> UpdaterError {
        map_kube_error(kind, name, &self.namespace, err)
    }
}

/// Maps API status codes onto the updater's taxonomy: 404 is a missing
/// object, 409 a lost optimistic-concurrency race.
pub fn map_kube_error(
    kind: &'static str,
    name: &str,
    namespace: &str,
    err: kube::Error,
) -> UpdaterError {
    match err {
        kube::Error::Api(ref resp) if resp.code == 404 => UpdaterError::NotFound {
            kind,
            name: name.to_string(),
            namespace: namespace.to_string(),
        },
        kube::Error::Api(ref resp) if resp.code == 409 => UpdaterError::Conflict {
            kind,
            name: name.to_string(),
            namespace: namespace.to_string(),
        },
        e => UpdaterError::Kubernetes(format!(
            "{} {}/{}: {}",
            kind, namespace, name, e
        )),
    }
}

fn object_name(name: Option<&str>, kind: &str) -> Result<String> {
    name.map(str::to_string)
        .ok_or_else(|| UpdaterError::Kubernetes(format!("{} has no name", kind)))
}

#[async_trait]
impl ClusterApi for K8sClient {
    async fn get_config_map(&self, name: &str) -> Result<ConfigMap> {
        self.config_maps()
            .get(name)
            .await
            .map_err(|e| self.map_error("ConfigMap", name, e))
    }

    async fn replace_config_map(&self, config_map: &ConfigMap) -> Result<ConfigMap> {
        let name = object_name(config_map.metadata.name.as_deref(), "ConfigMap")?;
        self.config_maps()
            .replace(&name, &PostParams::default(), config_map)
            .await
            .map_err(|e| self.map_error("ConfigMap", &name, e))
    }

    async fn get_workload(&self, kind: WorkloadKind, name: &str) -> Result<Workload> {
        match kind {
            WorkloadKind::DaemonSet => self
                .daemon_sets()
                .get(name)
                .await
                .map(|ds| Workload::DaemonSet(Box::new(ds)))
                .map_err(|e| self.map_error(kind.object_kind(), name, e)),
            WorkloadKind::Deployment => self
                .deployments()
                .get(name)
                .await
                .map(|d| Workload::Deployment(Box::new(d)))
                .map_err(|e| self.map_error(kind.object_kind(), name, e)),
        }
    }

    async fn replace_workload(&self, workload: &Workload) -> Result<Workload> {
        let kind = workload.kind().object_kind();
        let name = object_name(workload.name(), kind)?;
        let pp = PostParams::default();

        match workload {
            Workload::DaemonSet(ds) => self
                .daemon_sets()
                .replace(&name, &pp, ds)
                .await
                .map(|ds| Workload::DaemonSet(Box::new(ds)))
                .map_err(|e| self.map_error(kind, &name, e)),
            Workload::Deployment(d) => self
                .deployments()
                .replace(&name, &pp, d)
                .await
                .map(|d| Workload::Deployment(Box::new(d)))
                .map_err(|e| self.map_error(kind, &name, e)),
        }
    }
}
