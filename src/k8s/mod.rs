pub mod client;
pub mod config_store;
pub mod rollout;
pub mod types;

pub use client::{ClusterApi, K8sClient};
pub use config_store::ConfigStoreWriter;
pub use rollout::RolloutTrigger;
pub use types::{Workload, WorkloadKind};

#[cfg(test)]
pub(crate) mod testing;
