pub mod settings;
pub mod target;

pub use settings::{parse_interval, BackendIdentity, UpdaterConfig, WorkloadTargets};
pub use target::{api_url_for_config_check, streaming_url};
