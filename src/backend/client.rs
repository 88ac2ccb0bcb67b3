use crate::backend::types::{ConfigBlob, ConfigResponse, RestartStatusResponse};
use crate::config::BackendIdentity;
use crate::k8s::WorkloadKind;
use crate::{Result, UpdaterError};
use async_trait::async_trait;
use reqwest::Url;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

const RESTART_STATUS_PATH: &str = "api/v1/agent/restart-status";
const INGESTION_RULES_PATH: &str = "api/v1/agent/ingestion-rules";
const PLATFORM: &str = "k8s";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// The two reads the updater performs against the backend.
#[async_trait]
pub trait ConfigBackend: Send + Sync {
    /// Asks whether any workload kind has a new configuration. A response with
    /// `status == false` is returned as-is; callers decide what it means.
    async fn check_restart_status(&self) -> Result<RestartStatusResponse>;

    /// Fetches the configuration blob for `kind`. Fails with
    /// [`UpdaterError::EmptyConfig`] rather than return an empty blob.
    async fn fetch_config(&self, kind: WorkloadKind) -> Result<ConfigBlob>;
}

pub struct BackendClient {
    http: reqwest::Client,
    identity: BackendIdentity,
}

impl BackendClient {
    pub fn new(identity: BackendIdentity) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| UpdaterError::Transport(format!("failed to build http client: {}", e)))?;

        Ok(Self { http, identity })
    }

    pub fn identity(&self) -> &BackendIdentity {
        &self.identity
    }

    /// `{base}/{path}/{api_key}?platform=k8s&cluster=..&host_id=..&agent_version=..`
    pub fn endpoint(&self, path: &str, kind: Option<WorkloadKind>) -> Result<Url> {
        let mut url = Url::parse(&self.identity.base_url).map_err(|e| {
            UpdaterError::InvalidTarget(format!("{}: {}", self.identity.base_url, e))
        })?;

        url.path_segments_mut()
            .map_err(|_| UpdaterError::InvalidTarget(self.identity.base_url.clone()))?
            .pop_if_empty()
            .extend(path.split('/'))
            .push(&self.identity.api_key);

        {
            let mut query = url.query_pairs_mut();
            query.append_pair("platform", PLATFORM);
            if let Some(kind) = kind {
                query.append_pair("component_type", kind.as_str());
            }
            query
                .append_pair("cluster", &self.identity.cluster_name)
                .append_pair("host_id", &self.identity.cluster_name)
                .append_pair("agent_version", &self.identity.agent_version);
        }

        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url, api: &str) -> Result<T> {
        debug!(api, "calling backend");

        let response = self.http.get(url).send().await.map_err(|e| {
            UpdaterError::Transport(format!("failed to call {} api: {}", api, e))
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpdaterError::Transport(format!(
                "{} api returned non-success status: {}",
                api, status
            )));
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            UpdaterError::Decode(format!("failed to parse {} api response: {}", api, e))
        })
    }
}

#[async_trait]
impl ConfigBackend for BackendClient {
    async fn check_restart_status(&self) -> Result<RestartStatusResponse> {
        let url = self.endpoint(RESTART_STATUS_PATH, None)?;
        self.get_json(url, "restart-status").await
    }

    async fn fetch_config(&self, kind: WorkloadKind) -> Result<ConfigBlob> {
        let url = self.endpoint(INGESTION_RULES_PATH, Some(kind))?;
        let response: ConfigResponse = self.get_json(url, "ingestion-rules").await?;

        if !response.status {
            return Err(UpdaterError::Rejected(format!(
                "ingestion rules for {}: {}",
                kind, response.message
            )));
        }

        response
            .config
            .for_kind(kind)
            .cloned()
            .ok_or(UpdaterError::EmptyConfig { kind })
    }
}
