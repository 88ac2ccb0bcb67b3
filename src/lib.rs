//! Keeps a cluster-resident agent's pipeline configuration in sync with its
//! backend. The [`sync::SyncController`] polls the backend, writes changed
//! configuration into the per-workload ConfigMaps and bumps a pod-template
//! label so the cluster rolls the affected DaemonSet or Deployment.

pub mod backend;
pub mod cli;
pub mod config;
pub mod error;
pub mod k8s;
pub mod sync;

pub use error::{Result, UpdaterError};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
