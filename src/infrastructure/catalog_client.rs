// HTTP fetcher for catalog and URL-hosted dashboard documents
use crate::application::dashboard_fetcher::{DashboardFetcher, FetchError};
use crate::domain::dashboard::{DashboardDocument, DashboardSource};
use async_trait::async_trait;
use serde_json::Value;

#[derive(Debug, Clone)]
pub struct HttpDashboardFetcher {
    catalog_base_url: String,
    client: reqwest::Client,
}

impl HttpDashboardFetcher {
    pub fn new(catalog_base_url: &str) -> Self {
        Self {
            catalog_base_url: catalog_base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn location(&self, source: &DashboardSource) -> String {
        match source {
            DashboardSource::Catalog(id) => format!(
                "{}/api/dashboards/{}/revisions/latest/download",
                self.catalog_base_url, id
            ),
            DashboardSource::Url(url) => url.clone(),
        }
    }
}

#[async_trait]
impl DashboardFetcher for HttpDashboardFetcher {
    async fn fetch(&self, source: &DashboardSource) -> Result<DashboardDocument, FetchError> {
        let location = self.location(source);
        tracing::debug!(%location, "fetching dashboard document");

        let response = self
            .client
            .get(&location)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| FetchError::Unreachable {
                location: location.clone(),
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(FetchError::Status {
                location,
                status: response.status().as_u16(),
            });
        }

        let body = response.json::<Value>().await.map_err(|e| FetchError::Decode {
            location: location.clone(),
            reason: e.to_string(),
        })?;

        if !body.is_object() {
            return Err(FetchError::Decode {
                location,
                reason: "expected a JSON object".to_string(),
            });
        }

        Ok(DashboardDocument::new(body))
    }
}
