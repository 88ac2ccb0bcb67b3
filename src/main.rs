use clap::Parser;
use kube_config_updater::cli::{commands, Cli};
use std::process;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    info!("Starting mw-config-updater v{}", kube_config_updater::VERSION);

    if let Err(e) = commands::handle_command(cli.command).await {
        error!(error = %e, "could not run application");
        process::exit(1);
    }
}
