use crate::application::bootstrap_service::BootstrapPlan;
use crate::application::import_service::ImportPlan;
use crate::domain::dashboard::{DashboardDefinition, DashboardGroup, DashboardSource, InputResolver};
use crate::domain::datasource::{DataSourceKind, DataSourceTarget};
use crate::domain::organization::{FederatedAccess, Organization};
use crate::domain::tenant::ServiceAccountPolicy;
use anyhow::{bail, Context};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::PathBuf;

pub const DEFAULT_CONFIG_PATH: &str = "config/provision";
const ENV_PREFIX: &str = "PROVISION";

#[derive(Debug, Deserialize, Clone)]
pub struct ProvisionConfig {
    pub grafana: GrafanaSettings,
    #[serde(default)]
    pub credentials: CredentialSettings,
    #[serde(default)]
    pub catalog: CatalogSettings,
    #[serde(default = "default_tenant_header")]
    pub tenant_header: String,
    #[serde(default = "default_data_sources")]
    pub data_sources: Vec<DataSourceConfig>,
    pub orgs: Vec<OrgConfig>,
    #[serde(default)]
    pub federated_access: Vec<FederationConfig>,
    #[serde(default)]
    pub service_account: ServiceAccountConfig,
    #[serde(default)]
    pub dashboard_groups: Vec<DashboardGroupConfig>,
    #[serde(default = "default_input_overrides")]
    pub input_overrides: Vec<String>,
    #[serde(default = "default_output_path")]
    pub output_path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GrafanaSettings {
    pub url: String,
    #[serde(default = "default_admin_user")]
    pub admin_user: String,
    /// Skips the secret lookup when set
    #[serde(default)]
    pub admin_password: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CredentialSettings {
    pub namespace: String,
    pub secret_name: String,
    pub secret_key: String,
    pub fallback_password: String,
}

impl Default for CredentialSettings {
    fn default() -> Self {
        Self {
            namespace: "observability-prd".to_string(),
            secret_name: "grafana-admin-creds".to_string(),
            secret_key: "admin-password".to_string(),
            fallback_password: "admin".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct CatalogSettings {
    pub base_url: String,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            base_url: "https://grafana.com".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DataSourceConfig {
    pub kind: DataSourceKind,
    #[serde(default)]
    pub name: Option<String>,
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OrgConfig {
    pub name: String,
    /// Defaults to the organization name
    #[serde(default)]
    pub tenant_id: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FederationConfig {
    pub org: String,
    /// Pipe-delimited, e.g. `platform-obs|platform-k8s`
    pub tenants: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServiceAccountConfig {
    #[serde(default = "default_account_name")]
    pub name: String,
    #[serde(default = "default_account_role")]
    pub role: String,
    #[serde(default = "default_token_prefix")]
    pub token_prefix: String,
    #[serde(default = "default_true")]
    pub revoke_previous_tokens: bool,
}

impl Default for ServiceAccountConfig {
    fn default() -> Self {
        Self {
            name: default_account_name(),
            role: default_account_role(),
            token_prefix: default_token_prefix(),
            revoke_previous_tokens: true,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardGroupConfig {
    pub orgs: Vec<String>,
    #[serde(default)]
    pub dashboards: Vec<DashboardConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardConfig {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub url: Option<String>,
    pub name: String,
    #[serde(default = "default_folder")]
    pub folder: String,
}

impl DashboardConfig {
    fn source(&self) -> anyhow::Result<DashboardSource> {
        match (self.id, &self.url) {
            (Some(id), None) => Ok(DashboardSource::Catalog(id)),
            (None, Some(url)) => Ok(DashboardSource::Url(url.clone())),
            (Some(_), Some(_)) => bail!("dashboard '{}' sets both id and url", self.name),
            (None, None) => bail!("dashboard '{}' needs an id or a url", self.name),
        }
    }
}

fn default_tenant_header() -> String {
    "X-Scope-OrgID".to_string()
}

fn default_data_sources() -> Vec<DataSourceConfig> {
    vec![
        DataSourceConfig {
            kind: DataSourceKind::Metrics,
            name: None,
            url: "http://mimir-nginx.observability-prd.svc:80/prometheus".to_string(),
        },
        DataSourceConfig {
            kind: DataSourceKind::Logs,
            name: None,
            url: "http://loki-gateway.observability-prd.svc:80".to_string(),
        },
        DataSourceConfig {
            kind: DataSourceKind::Traces,
            name: None,
            url: "http://tempo.observability-prd.svc:3100".to_string(),
        },
    ]
}

fn default_input_overrides() -> Vec<String> {
    vec!["VAR_DATASOURCE".to_string(), "DS_PROMETHEUS".to_string()]
}

fn default_output_path() -> PathBuf {
    PathBuf::from("grafana-tenants.json")
}

fn default_admin_user() -> String {
    "admin".to_string()
}

fn default_account_name() -> String {
    "tenant-provisioner".to_string()
}

fn default_account_role() -> String {
    "Admin".to_string()
}

fn default_token_prefix() -> String {
    "provision".to_string()
}

fn default_folder() -> String {
    "General".to_string()
}

fn default_true() -> bool {
    true
}

/// Loads `<path>.{toml,yaml,json}` layered with `PROVISION__SECTION__KEY` variables.
pub fn load_provision_config(path: &str) -> anyhow::Result<ProvisionConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name(path))
        .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
        .build()
        .with_context(|| format!("failed to read configuration from {}", path))?;

    let config: ProvisionConfig = settings.try_deserialize()?;
    config.validate()?;
    Ok(config)
}

impl ProvisionConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        let mut names = HashSet::new();
        for org in &self.orgs {
            if org.name.trim().is_empty() {
                bail!("organization names must not be empty");
            }
            if !names.insert(org.name.as_str()) {
                bail!("organization '{}' is configured twice", org.name);
            }
        }

        let mut federated = HashSet::new();
        for entry in &self.federated_access {
            if !names.contains(entry.org.as_str()) {
                bail!("federated access names unknown organization '{}'", entry.org);
            }
            if !federated.insert(entry.org.as_str()) {
                bail!("federated access for '{}' is configured twice", entry.org);
            }
            if entry.tenants.split('|').all(|t| t.trim().is_empty()) {
                bail!("federated access for '{}' lists no tenants", entry.org);
            }
        }

        let mut kinds = HashSet::new();
        for data_source in &self.data_sources {
            if !kinds.insert(data_source.kind) {
                bail!("data source kind {:?} is configured twice", data_source.kind);
            }
        }

        for group in &self.dashboard_groups {
            for dashboard in &group.dashboards {
                dashboard.source()?;
            }
        }

        Ok(())
    }

    pub fn organizations(&self) -> Vec<Organization> {
        self.orgs
            .iter()
            .map(|org| {
                let tenant_id = org.tenant_id.clone().unwrap_or_else(|| org.name.clone());
                Organization::new(org.name.clone(), tenant_id)
            })
            .collect()
    }

    pub fn federation(&self) -> FederatedAccess {
        let mut access = FederatedAccess::new();
        for entry in &self.federated_access {
            access.grant(entry.org.clone(), &entry.tenants);
        }
        access
    }

    pub fn data_source_targets(&self) -> Vec<DataSourceTarget> {
        self.data_sources
            .iter()
            .map(|ds| DataSourceTarget {
                kind: ds.kind,
                name: ds.name.clone().unwrap_or_else(|| ds.kind.default_name().to_string()),
                url: ds.url.clone(),
            })
            .collect()
    }

    pub fn bootstrap_plan(&self) -> BootstrapPlan {
        BootstrapPlan {
            orgs: self.organizations(),
            federation: self.federation(),
            tenant_header: self.tenant_header.clone(),
            data_sources: self.data_source_targets(),
            service_account: ServiceAccountPolicy {
                name: self.service_account.name.clone(),
                role: self.service_account.role.clone(),
                token_prefix: self.service_account.token_prefix.clone(),
                revoke_previous_tokens: self.service_account.revoke_previous_tokens,
            },
        }
    }

    pub fn import_plan(&self) -> anyhow::Result<ImportPlan> {
        let names = self
            .data_source_targets()
            .into_iter()
            .map(|target| (target.kind, target.name))
            .collect();

        let groups = self
            .dashboard_groups
            .iter()
            .map(|group| {
                let dashboards = group
                    .dashboards
                    .iter()
                    .map(|dashboard| {
                        Ok(DashboardDefinition {
                            source: dashboard.source()?,
                            name: dashboard.name.clone(),
                            folder: dashboard.folder.clone(),
                        })
                    })
                    .collect::<anyhow::Result<Vec<_>>>()?;
                Ok(DashboardGroup {
                    dashboards,
                    orgs: group.orgs.clone(),
                })
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        Ok(ImportPlan {
            groups,
            inputs: InputResolver::new(names, self.input_overrides.clone()),
        })
    }
}
