pub mod commands;

use crate::config::settings::{
    DEFAULT_CONFIG_CHECK_INTERVAL, DEFAULT_DAEMONSET_CONFIGMAP, DEFAULT_DEPLOYMENT_CONFIGMAP,
    DEFAULT_NAMESPACE, DEFAULT_WORKLOAD_NAME,
};
use crate::config::{UpdaterConfig, WorkloadTargets};
use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "mw-config-updater")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Kubernetes agent configuration updater", long_about = None)]
pub struct Cli {
    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(
        about = "Watch for configuration updates and restart the agent when a change is detected"
    )]
    Update(UpdaterArgs),
    #[command(about = "Update the configmaps as per server settings")]
    ForceUpdateConfigmaps(UpdaterArgs),
}

#[derive(Args, Debug, Clone)]
pub struct UpdaterArgs {
    #[arg(long, env = "MW_API_KEY", help = "API key for your account")]
    pub api_key: String,

    #[arg(long, env = "MW_TARGET", help = "Target URL for your account")]
    pub target: Option<String>,

    #[arg(
        long,
        env = "MW_CONFIG_CHECK_INTERVAL",
        default_value = DEFAULT_CONFIG_CHECK_INTERVAL,
        help = "Interval between configuration checks. 0 disables checking"
    )]
    pub config_check_interval: String,

    #[arg(long, env = "MW_API_URL_FOR_CONFIG_CHECK", hide = true)]
    pub api_url_for_config_check: Option<String>,

    #[arg(long, env = "MW_KUBE_CLUSTER_NAME", default_value = "", help = "Cluster name reported to the backend")]
    pub cluster_name: String,

    #[arg(long, env = "MW_NAMESPACE", default_value = DEFAULT_NAMESPACE, help = "Namespace the agent runs in")]
    pub namespace: String,

    #[arg(long, default_value = DEFAULT_WORKLOAD_NAME, help = "Agent DaemonSet name")]
    pub daemonset: String,

    #[arg(long, default_value = DEFAULT_WORKLOAD_NAME, help = "Agent Deployment name")]
    pub deployment: String,

    #[arg(long, default_value = DEFAULT_DAEMONSET_CONFIGMAP, help = "ConfigMap used by the DaemonSet")]
    pub daemonset_configmap: String,

    #[arg(long, default_value = DEFAULT_DEPLOYMENT_CONFIGMAP, help = "ConfigMap used by the Deployment")]
    pub deployment_configmap: String,
}

impl From<UpdaterArgs> for UpdaterConfig {
    fn from(args: UpdaterArgs) -> Self {
        UpdaterConfig {
            api_key: args.api_key,
            target: args.target,
            api_url_for_config_check: args.api_url_for_config_check,
            config_check_interval: args.config_check_interval,
            cluster_name: args.cluster_name,
            agent_version: crate::VERSION.to_string(),
            workloads: WorkloadTargets {
                namespace: args.namespace,
                daemonset: args.daemonset,
                deployment: args.deployment,
                daemonset_configmap: args.daemonset_configmap,
                deployment_configmap: args.deployment_configmap,
            },
        }
    }
}
