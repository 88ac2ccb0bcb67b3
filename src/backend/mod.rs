pub mod client;
pub mod types;

pub use client::{BackendClient, ConfigBackend};
pub use types::{ConfigBlob, ConfigPayload, ConfigResponse, RestartStatusResponse, RolloutFlags};
