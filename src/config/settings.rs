use crate::config::target;
use crate::k8s::WorkloadKind;
use crate::{Result, UpdaterError};
use std::time::Duration;
use tracing::info;

pub const DEFAULT_NAMESPACE: &str = "mw-agent-ns";
pub const DEFAULT_WORKLOAD_NAME: &str = "mw-kube-agent";
pub const DEFAULT_DAEMONSET_CONFIGMAP: &str = "mw-daemonset-otel-config";
pub const DEFAULT_DEPLOYMENT_CONFIGMAP: &str = "mw-deployment-otel-config";
pub const DEFAULT_CONFIG_CHECK_INTERVAL: &str = "60s";

/// Names of the cluster objects managed for each workload kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkloadTargets {
    pub namespace: String,
    pub daemonset: String,
    pub deployment: String,
    pub daemonset_configmap: String,
    pub deployment_configmap: String,
}

impl WorkloadTargets {
    pub fn workload_name(&self, kind: WorkloadKind) -> &str {
        match kind {
            WorkloadKind::DaemonSet => &self.daemonset,
            WorkloadKind::Deployment => &self.deployment,
        }
    }

    pub fn config_map_name(&self, kind: WorkloadKind) -> &str {
        match kind {
            WorkloadKind::DaemonSet => &self.daemonset_configmap,
            WorkloadKind::Deployment => &self.deployment_configmap,
        }
    }
}

impl Default for WorkloadTargets {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            daemonset: DEFAULT_WORKLOAD_NAME.to_string(),
            deployment: DEFAULT_WORKLOAD_NAME.to_string(),
            daemonset_configmap: DEFAULT_DAEMONSET_CONFIGMAP.to_string(),
            deployment_configmap: DEFAULT_DEPLOYMENT_CONFIGMAP.to_string(),
        }
    }
}

/// Identity the updater presents to the backend on every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendIdentity {
    pub base_url: String,
    pub api_key: String,
    pub cluster_name: String,
    pub agent_version: String,
}

/// Full updater configuration, as assembled by the CLI.
#[derive(Debug, Clone)]
pub struct UpdaterConfig {
    pub api_key: String,
    pub target: Option<String>,
    pub api_url_for_config_check: Option<String>,
    pub config_check_interval: String,
    pub cluster_name: String,
    pub agent_version: String,
    pub workloads: WorkloadTargets,
}

impl Default for UpdaterConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            target: None,
            api_url_for_config_check: None,
            config_check_interval: DEFAULT_CONFIG_CHECK_INTERVAL.to_string(),
            cluster_name: String::new(),
            agent_version: crate::VERSION.to_string(),
            workloads: WorkloadTargets::default(),
        }
    }
}

impl UpdaterConfig {
    /// Checks every field needed to start, returning the first problem found.
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(UpdaterError::Config("api key must not be empty".to_string()));
        }
        self.base_url()?;
        self.poll_interval()?;

        let w = &self.workloads;
        for (field, value) in [
            ("namespace", &w.namespace),
            ("daemonset", &w.daemonset),
            ("deployment", &w.deployment),
            ("daemonset configmap", &w.daemonset_configmap),
            ("deployment configmap", &w.deployment_configmap),
        ] {
            if value.trim().is_empty() {
                return Err(UpdaterError::Config(format!("{} must not be empty", field)));
            }
        }

        Ok(())
    }

    /// Backend origin: the explicit override when set, otherwise derived
    /// from the target.
    pub fn base_url(&self) -> Result<String> {
        if let Some(url) = self.api_url_for_config_check.as_deref().filter(|u| !u.is_empty()) {
            return Ok(url.trim_end_matches('/').to_string());
        }

        let target = self.target.as_deref().unwrap_or_default();
        let url = target::api_url_for_config_check(target)?;
        info!(api_url_for_config_check = %url, "derived api url for config check");
        Ok(url)
    }

    /// `None` when polling is disabled by a zero interval.
    pub fn poll_interval(&self) -> Result<Option<Duration>> {
        let interval = parse_interval(&self.config_check_interval)?;
        Ok((!interval.is_zero()).then_some(interval))
    }

    pub fn backend_identity(&self) -> Result<BackendIdentity> {
        Ok(BackendIdentity {
            base_url: self.base_url()?,
            api_key: self.api_key.clone(),
            cluster_name: self.cluster_name.clone(),
            agent_version: self.agent_version.clone(),
        })
    }
}

/// Parses `500ms`, `30s`, `5m`, `1h` or a bare `0`.
pub fn parse_interval(s: &str) -> Result<Duration> {
    let s = s.trim();
    if s == "0" {
        return Ok(Duration::ZERO);
    }

    let (num, unit_ms) = if let Some(n) = s.strip_suffix("ms") {
        (n, 1u64)
    } else if let Some(n) = s.strip_suffix('s') {
        (n, 1000u64)
    } else if let Some(n) = s.strip_suffix('m') {
        (n, 60_000u64)
    } else if let Some(n) = s.strip_suffix('h') {
        (n, 3_600_000u64)
    } else {
        return Err(UpdaterError::Config(format!(
            "invalid interval {:?}. Use: 0, 500ms, 30s, 5m, 1h",
            s
        )));
    };

    let value: u64 = num
        .parse()
        .map_err(|_| UpdaterError::Config(format!("invalid interval number in {:?}", s)))?;

    value
        .checked_mul(unit_ms)
        .map(Duration::from_millis)
        .ok_or_else(|| UpdaterError::Config(format!("interval {:?} is too large", s)))
}
