use crate::backend::BackendClient;
use crate::cli::Commands;
use crate::config::UpdaterConfig;
use crate::k8s::{ClusterApi, ConfigStoreWriter, K8sClient, RolloutTrigger};
use crate::sync::{CycleReport, KindOutcome, SyncController};
use crate::{Result, UpdaterError};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

pub async fn handle_command(command: Commands) -> Result<()> {
    match command {
        Commands::Update(args) => handle_update(args.into()).await,
        Commands::ForceUpdateConfigmaps(args) => handle_force_update(args.into()).await,
    }
}

/// Validates the configuration and wires the controller against the live
/// cluster. Fails when no cluster credentials are available.
async fn build_controller(config: &UpdaterConfig) -> Result<SyncController> {
    config.validate()?;

    let backend = BackendClient::new(config.backend_identity()?)?;
    let cluster: Arc<dyn ClusterApi> =
        Arc::new(K8sClient::try_default(config.workloads.namespace.clone()).await?);

    Ok(SyncController::new(
        Arc::new(backend),
        ConfigStoreWriter::new(cluster.clone(), config.workloads.clone()),
        RolloutTrigger::new(cluster, config.workloads.clone()),
        config.poll_interval()?,
    ))
}

async fn handle_update(config: UpdaterConfig) -> Result<()> {
    let controller = build_controller(&config).await?;
    let cancel = CancellationToken::new();

    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            shutdown_signal().await;
            info!("Shutdown signal received");
            cancel.cancel();
        }
    });

    controller.run(cancel).await;
    Ok(())
}

async fn handle_force_update(config: UpdaterConfig) -> Result<()> {
    let controller = build_controller(&config).await?;
    let report = controller.force_update(&CancellationToken::new()).await;
    summarize(&report)
}

fn summarize(report: &CycleReport) -> Result<()> {
    let failed: Vec<String> = [
        ("daemonset", &report.daemonset),
        ("deployment", &report.deployment),
    ]
    .into_iter()
    .filter_map(|(kind, outcome)| match outcome {
        KindOutcome::Failed { operation, error } => {
            Some(format!("{} {}: {}", kind, operation, error))
        }
        _ => None,
    })
    .collect();

    if failed.is_empty() {
        info!(applied = report.applied(), "configmaps updated");
        Ok(())
    } else {
        warn!(failed = failed.len(), "some workloads were not updated");
        Err(UpdaterError::UpdateFailed(failed.join("; ")))
    }
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = term.recv() => {}
                }
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::{CheckOutcome, Operation};

    #[test]
    fn test_summarize_success() {
        let mut report = CycleReport::new(CheckOutcome::NotRun);
        report.daemonset = KindOutcome::Applied { timestamp: 1 };
        assert!(summarize(&report).is_ok());
    }

    #[test]
    fn test_summarize_failure() {
        let mut report = CycleReport::new(CheckOutcome::NotRun);
        report.deployment = KindOutcome::Failed {
            operation: Operation::UpdateConfig,
            error: "not found".to_string(),
        };

        let err = summarize(&report).unwrap_err();
        assert!(err.to_string().contains("deployment update_config: not found"));
    }
}
