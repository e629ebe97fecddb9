// Main entry point - Configuration, credentials and command dispatch
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::sync::Arc;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::application::grafana_api::GrafanaApi;
use crate::infrastructure::config::load_provision_config;
use crate::infrastructure::credentials::resolve_admin_credentials;
use crate::infrastructure::grafana_client::GrafanaClient;
use crate::presentation::cli::{Cli, Command};
use crate::presentation::commands::{bootstrap_tenants, import_dashboards};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("obs_provision=info")),
        )
        .init();

    // Load configuration
    let config = load_provision_config(&cli.config)?;
    let credentials = resolve_admin_credentials(&config.grafana, &config.credentials).await;

    let api: Arc<dyn GrafanaApi> = Arc::new(GrafanaClient::new(&config.grafana.url, credentials));

    // Connectivity is the only fatal check
    if let Err(e) = api.health().await {
        tracing::error!(url = %config.grafana.url, error = %e, "dashboard server health check failed");
        anyhow::bail!("could not connect to {}: {}", config.grafana.url, e);
    }

    match cli.command {
        Command::BootstrapTenants => bootstrap_tenants(api, &config).await,
        Command::ImportDashboards => import_dashboards(api, &config).await,
    }
}
