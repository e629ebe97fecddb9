// Subcommand runners
use crate::application::bootstrap_service::BootstrapService;
use crate::application::grafana_api::GrafanaApi;
use crate::application::import_service::ImportService;
use crate::domain::tenant::BootstrapResults;
use crate::infrastructure::catalog_client::HttpDashboardFetcher;
use crate::infrastructure::config::ProvisionConfig;
use crate::infrastructure::results_store::{read_results, write_results};
use std::sync::Arc;

pub async fn bootstrap_tenants(api: Arc<dyn GrafanaApi>, config: &ProvisionConfig) -> anyhow::Result<()> {
    tracing::info!(orgs = config.orgs.len(), "starting tenant bootstrap");

    let previous = read_results(&config.output_path).unwrap_or_else(|e| {
        let reason = format!("{:#}", e);
        tracing::warn!(error = %reason, "ignoring previous bootstrap results");
        BootstrapResults::new()
    });

    let service = BootstrapService::new(api, config.bootstrap_plan());
    let report = service.run(&previous).await;

    write_results(&config.output_path, &report.results)?;
    tracing::info!(
        path = %config.output_path.display(),
        orgs = report.results.len(),
        "wrote bootstrap results"
    );

    if report.failures.is_empty() {
        tracing::info!("bootstrap complete");
    } else {
        tracing::warn!(failed = ?report.failures, "bootstrap finished with failures");
    }
    Ok(())
}

pub async fn import_dashboards(api: Arc<dyn GrafanaApi>, config: &ProvisionConfig) -> anyhow::Result<()> {
    let plan = config.import_plan()?;
    tracing::info!(groups = plan.groups.len(), "starting dashboard import");

    let fetcher = Arc::new(HttpDashboardFetcher::new(&config.catalog.base_url));
    let report = ImportService::new(api, fetcher, plan).run().await;

    tracing::info!(
        imported = report.imported,
        skipped = report.skipped,
        failed = report.failed,
        "dashboard import complete"
    );
    Ok(())
}
