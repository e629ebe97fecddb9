// Organization name to id resolution
use crate::application::grafana_api::{ApiError, GrafanaApi};
use crate::domain::organization::OrgId;
use std::sync::Arc;

#[derive(Clone)]
pub struct OrgResolver {
    api: Arc<dyn GrafanaApi>,
}

impl OrgResolver {
    pub fn new(api: Arc<dyn GrafanaApi>) -> Self {
        Self { api }
    }

    /// Exact lookup by name first, then a scan of the full organization list.
    pub async fn resolve(&self, name: &str) -> Result<Option<OrgId>, ApiError> {
        if let Some(org) = self.api.find_org_by_name(name).await? {
            return Ok(Some(org.id));
        }

        tracing::debug!(org = name, "name lookup missed, scanning organization list");
        let orgs = self.api.list_orgs().await?;
        Ok(orgs.into_iter().find(|org| org.name == name).map(|org| org.id))
    }

    /// Creates the organization, or resolves it when it already exists.
    pub async fn ensure(&self, name: &str) -> Result<OrgId, ApiError> {
        match self.api.create_org(name).await {
            Ok(id) => {
                tracing::info!(org = name, org_id = id, "created organization");
                Ok(id)
            }
            Err(ApiError::Conflict(_)) => {
                let id = self
                    .resolve(name)
                    .await?
                    .ok_or_else(|| ApiError::NotFound(format!("organization '{}'", name)))?;
                tracing::info!(org = name, org_id = id, "organization already exists");
                Ok(id)
            }
            Err(e) => Err(e),
        }
    }
}
