// Bootstrap service - Organizations, tenant-scoped data sources and service account tokens
use crate::application::grafana_api::{ApiError, GrafanaApi, IssuedToken};
use crate::application::org_resolver::OrgResolver;
use crate::domain::datasource::{DataSourceSpec, DataSourceTarget};
use crate::domain::organization::{FederatedAccess, OrgId, Organization};
use crate::domain::tenant::{BootstrapResults, ServiceAccountPolicy, TenantRecord};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct BootstrapPlan {
    pub orgs: Vec<Organization>,
    pub federation: FederatedAccess,
    pub tenant_header: String,
    pub data_sources: Vec<DataSourceTarget>,
    pub service_account: ServiceAccountPolicy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    Updated,
}

#[derive(Debug, Default)]
pub struct BootstrapReport {
    pub results: BootstrapResults,
    /// Units of work that failed, e.g. `devteam-1/Loki`
    pub failures: Vec<String>,
}

#[derive(Clone)]
pub struct BootstrapService {
    api: Arc<dyn GrafanaApi>,
    orgs: OrgResolver,
    plan: BootstrapPlan,
}

impl BootstrapService {
    pub fn new(api: Arc<dyn GrafanaApi>, plan: BootstrapPlan) -> Self {
        Self {
            orgs: OrgResolver::new(api.clone()),
            api,
            plan,
        }
    }

    /// `previous` is the last results file; its token is kept for an org whose
    /// new token could not be issued.
    pub async fn run(&self, previous: &BootstrapResults) -> BootstrapReport {
        let mut report = BootstrapReport::default();

        for org in &self.plan.orgs {
            let org_id = match self.orgs.ensure(&org.name).await {
                Ok(id) => id,
                Err(e) => {
                    tracing::error!(org = %org.name, error = %e, "could not create organization, skipping");
                    report.failures.push(org.name.clone());
                    continue;
                }
            };

            let scope = self.plan.federation.scope_for(org);
            for target in &self.plan.data_sources {
                let spec = target.scoped(scope.clone());
                match self.upsert_data_source(org_id, &spec).await {
                    Ok(outcome) => {
                        tracing::info!(
                            org = %org.name,
                            data_source = %spec.name,
                            tenant_scope = %spec.tenant_scope,
                            ?outcome,
                            "data source configured"
                        );
                    }
                    Err(e) => {
                        tracing::error!(org = %org.name, data_source = %spec.name, error = %e, "data source failed");
                        report.failures.push(format!("{}/{}", org.name, spec.name));
                    }
                }
            }

            let token = match self.issue_token(org_id).await {
                Ok(token) => {
                    tracing::info!(org = %org.name, token_name = %token.name, "issued service account token");
                    Some(token.key)
                }
                Err(e) => {
                    tracing::error!(org = %org.name, error = %e, "could not issue service account token");
                    report.failures.push(format!("{}/{}", org.name, self.plan.service_account.name));
                    previous
                        .get(&org.name)
                        .filter(|record| record.org_id == org_id)
                        .and_then(|record| record.token.clone())
                }
            };

            report.results.insert(
                org.name.clone(),
                TenantRecord {
                    org_id,
                    tenant_id: org.tenant_id.clone(),
                    token,
                },
            );
        }

        report
    }

    /// Updates the data source in place when one with the same name exists,
    /// keeping its identity stable across reruns.
    pub async fn upsert_data_source(&self, org_id: OrgId, spec: &DataSourceSpec) -> Result<UpsertOutcome, ApiError> {
        let payload = spec.to_payload(&self.plan.tenant_header);

        match self.api.find_data_source(org_id, &spec.name).await? {
            Some(existing) => {
                self.api.update_data_source(org_id, existing.id, &payload).await?;
                Ok(UpsertOutcome::Updated)
            }
            None => {
                self.api.create_data_source(org_id, &payload).await?;
                Ok(UpsertOutcome::Created)
            }
        }
    }

    /// The account is reused; a fresh token is minted on every call.
    pub async fn issue_token(&self, org_id: OrgId) -> Result<IssuedToken, ApiError> {
        let policy = &self.plan.service_account;

        let account = match self.api.find_service_account(org_id, &policy.name).await? {
            Some(account) => account,
            None => {
                let account = self.api.create_service_account(org_id, &policy.name, &policy.role).await?;
                tracing::info!(org_id, account = %account.name, "created service account");
                account
            }
        };

        let name = policy.token_name(chrono::Utc::now());
        let issued = self.api.create_token(org_id, account.id, &name).await?;

        // Older tokens go only once the replacement exists
        if policy.revoke_previous_tokens {
            let tokens = match self.api.list_tokens(org_id, account.id).await {
                Ok(tokens) => tokens,
                Err(e) => {
                    tracing::warn!(org_id, error = %e, "could not list previous tokens");
                    Vec::new()
                }
            };
            for token in tokens {
                if token.id == issued.id || !policy.owns_token(&token.name) {
                    continue;
                }
                match self.api.delete_token(org_id, account.id, token.id).await {
                    Ok(()) => tracing::debug!(org_id, token_name = %token.name, "revoked previous token"),
                    Err(e) => tracing::warn!(org_id, token_name = %token.name, error = %e, "could not revoke previous token"),
                }
            }
        }

        Ok(issued)
    }
}
