// Import service - Replays curated dashboards into their target organizations
use crate::application::dashboard_fetcher::DashboardFetcher;
use crate::application::grafana_api::{GrafanaApi, ImportRequest};
use crate::application::org_resolver::OrgResolver;
use crate::domain::dashboard::{DashboardDefinition, DashboardGroup, InputResolver};
use crate::domain::organization::OrgId;
use std::sync::Arc;

/// Folder label that maps to the server's root folder
const GENERAL_FOLDER: &str = "General";

#[derive(Debug, Clone)]
pub struct ImportPlan {
    pub groups: Vec<DashboardGroup>,
    pub inputs: InputResolver,
}

/// Counts are per dashboard and organization pair
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ImportReport {
    pub imported: usize,
    pub skipped: usize,
    pub failed: usize,
}

#[derive(Clone)]
pub struct ImportService {
    api: Arc<dyn GrafanaApi>,
    fetcher: Arc<dyn DashboardFetcher>,
    orgs: OrgResolver,
    plan: ImportPlan,
}

impl ImportService {
    pub fn new(api: Arc<dyn GrafanaApi>, fetcher: Arc<dyn DashboardFetcher>, plan: ImportPlan) -> Self {
        Self {
            orgs: OrgResolver::new(api.clone()),
            api,
            fetcher,
            plan,
        }
    }

    pub async fn run(&self) -> ImportReport {
        let mut report = ImportReport::default();

        for group in &self.plan.groups {
            for definition in &group.dashboards {
                self.import_everywhere(definition, &group.orgs, &mut report).await;
            }
        }

        report
    }

    async fn import_everywhere(&self, definition: &DashboardDefinition, org_names: &[String], report: &mut ImportReport) {
        let document = match self.fetcher.fetch(&definition.source).await {
            Ok(document) => document,
            Err(e) => {
                tracing::warn!(dashboard = %definition.name, error = %e, "fetch failed, skipping dashboard");
                report.skipped += org_names.len();
                return;
            }
        };

        let resolution = self.plan.inputs.resolve(&document.declared_inputs());
        for name in &resolution.unresolved {
            tracing::warn!(dashboard = %definition.name, input = %name, "no substitution for dashboard input");
        }
        let template = ImportRequest::new(document.into_importable(), resolution.bindings);

        for org_name in org_names {
            let org_id = match self.orgs.resolve(org_name).await {
                Ok(Some(id)) => id,
                Ok(None) => {
                    tracing::warn!(
                        dashboard = %definition.name,
                        org = %org_name,
                        "organization not found, run bootstrap-tenants first"
                    );
                    report.skipped += 1;
                    continue;
                }
                Err(e) => {
                    tracing::error!(org = %org_name, error = %e, "could not resolve organization");
                    report.failed += 1;
                    continue;
                }
            };

            let folder_uid = self.folder_uid(org_id, &definition.folder).await;
            match self.api.import_dashboard(org_id, &template.in_folder(folder_uid)).await {
                Ok(()) => {
                    tracing::info!(dashboard = %definition.name, org = %org_name, folder = %definition.folder, "imported dashboard");
                    report.imported += 1;
                }
                Err(e) => {
                    tracing::error!(dashboard = %definition.name, org = %org_name, error = %e, "import failed");
                    report.failed += 1;
                }
            }
        }
    }

    /// Finds or creates the folder. Any failure lands the dashboard in the root folder.
    async fn folder_uid(&self, org_id: OrgId, title: &str) -> Option<String> {
        let title = title.trim();
        if title.is_empty() || title.eq_ignore_ascii_case(GENERAL_FOLDER) {
            return None;
        }

        let folder = match self.api.find_folder(org_id, title).await {
            Ok(Some(folder)) => Ok(folder),
            Ok(None) => self.api.create_folder(org_id, title).await,
            Err(e) => Err(e),
        };

        match folder {
            Ok(folder) => Some(folder.uid),
            Err(e) => {
                tracing::warn!(org_id, folder = title, error = %e, "folder unavailable, using General");
                None
            }
        }
    }
}
