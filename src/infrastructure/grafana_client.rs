// Dashboard server admin API client
use crate::application::grafana_api::{
    ApiError, ExistingDataSource, Folder, GrafanaApi, ImportRequest, IssuedToken, OrgSummary, ServiceAccount,
    TokenSummary,
};
use crate::domain::datasource::DataSourcePayload;
use crate::domain::organization::OrgId;
use crate::infrastructure::credentials::{AdminCredentials, CredentialOrigin};
use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use std::sync::Once;

/// Header that switches the request into an organization's context
const ORG_CONTEXT_HEADER: &str = "X-Grafana-Org-Id";
const ORG_PAGE_SIZE: usize = 1000;
const FOLDER_LIMIT: usize = 1000;

#[derive(Debug)]
pub struct GrafanaClient {
    base_url: String,
    credentials: AdminCredentials,
    client: reqwest::Client,
    fallback_hint: Once,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatedOrg {
    org_id: OrgId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServiceAccountSearch {
    #[serde(default)]
    service_accounts: Vec<ServiceAccount>,
}

impl GrafanaClient {
    pub fn new(base_url: &str, credentials: AdminCredentials) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
            client: reqwest::Client::new(),
            fallback_hint: Once::new(),
        }
    }

    fn request(&self, method: Method, path: &str, org: Option<OrgId>) -> RequestBuilder {
        let builder = self
            .client
            .request(method, format!("{}{}", self.base_url, path))
            .basic_auth(&self.credentials.user, Some(&self.credentials.password))
            .header(reqwest::header::ACCEPT, "application/json");

        match org {
            Some(org) => builder.header(ORG_CONTEXT_HEADER, org.to_string()),
            None => builder,
        }
    }

    async fn send(builder: RequestBuilder) -> Result<Response, ApiError> {
        builder
            .send()
            .await
            .map_err(|e| ApiError::Unreachable(e.to_string()))
    }

    async fn ensure_success(&self, response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::UNAUTHORIZED && self.credentials.origin == CredentialOrigin::Fallback {
            self.fallback_hint.call_once(|| {
                tracing::error!("admin login rejected while using the fallback password; set PROVISION__GRAFANA__ADMIN_PASSWORD");
            });
        }
        let body = response.text().await.unwrap_or_default();
        Err(ApiError::Status {
            status: status.as_u16(),
            body,
        })
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn execute<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ApiError> {
        let response = self.ensure_success(Self::send(builder).await?).await?;
        Self::decode(response).await
    }

    async fn execute_unit(&self, builder: RequestBuilder) -> Result<(), ApiError> {
        self.ensure_success(Self::send(builder).await?).await?;
        Ok(())
    }

    /// 404 becomes `None`
    async fn lookup<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<Option<T>, ApiError> {
        let response = Self::send(builder).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = self.ensure_success(response).await?;
        Ok(Some(Self::decode(response).await?))
    }
}

#[async_trait]
impl GrafanaApi for GrafanaClient {
    async fn health(&self) -> Result<(), ApiError> {
        self.execute_unit(self.request(Method::GET, "/api/health", None)).await
    }

    async fn create_org(&self, name: &str) -> Result<OrgId, ApiError> {
        let builder = self
            .request(Method::POST, "/api/orgs", None)
            .json(&json!({ "name": name }));
        let response = Self::send(builder).await?;
        if response.status() == StatusCode::CONFLICT {
            return Err(ApiError::Conflict(format!("organization '{}'", name)));
        }
        let created: CreatedOrg = Self::decode(self.ensure_success(response).await?).await?;
        Ok(created.org_id)
    }

    async fn find_org_by_name(&self, name: &str) -> Result<Option<OrgSummary>, ApiError> {
        let path = format!("/api/orgs/name/{}", urlencoding::encode(name));
        self.lookup(self.request(Method::GET, &path, None)).await
    }

    async fn list_orgs(&self) -> Result<Vec<OrgSummary>, ApiError> {
        let mut orgs = Vec::new();
        let mut page = 1;
        loop {
            let path = format!("/api/orgs?perpage={}&page={}", ORG_PAGE_SIZE, page);
            let batch: Vec<OrgSummary> = self.execute(self.request(Method::GET, &path, None)).await?;
            let done = batch.len() < ORG_PAGE_SIZE;
            orgs.extend(batch);
            if done {
                return Ok(orgs);
            }
            page += 1;
        }
    }

    async fn find_data_source(&self, org: OrgId, name: &str) -> Result<Option<ExistingDataSource>, ApiError> {
        let path = format!("/api/datasources/name/{}", urlencoding::encode(name));
        self.lookup(self.request(Method::GET, &path, Some(org))).await
    }

    async fn create_data_source(&self, org: OrgId, payload: &DataSourcePayload) -> Result<(), ApiError> {
        let builder = self
            .request(Method::POST, "/api/datasources", Some(org))
            .json(payload);
        let response = Self::send(builder).await?;
        if response.status() == StatusCode::CONFLICT {
            return Err(ApiError::Conflict(format!("data source '{}'", payload.name)));
        }
        self.ensure_success(response).await?;
        Ok(())
    }

    async fn update_data_source(&self, org: OrgId, id: i64, payload: &DataSourcePayload) -> Result<(), ApiError> {
        let path = format!("/api/datasources/{}", id);
        self.execute_unit(self.request(Method::PUT, &path, Some(org)).json(payload)).await
    }

    async fn find_service_account(&self, org: OrgId, name: &str) -> Result<Option<ServiceAccount>, ApiError> {
        let path = format!("/api/serviceaccounts/search?query={}", urlencoding::encode(name));
        let search: ServiceAccountSearch = self.execute(self.request(Method::GET, &path, Some(org))).await?;
        // The search is a substring match
        Ok(search.service_accounts.into_iter().find(|account| account.name == name))
    }

    async fn create_service_account(&self, org: OrgId, name: &str, role: &str) -> Result<ServiceAccount, ApiError> {
        let builder = self
            .request(Method::POST, "/api/serviceaccounts", Some(org))
            .json(&json!({ "name": name, "role": role }));
        self.execute(builder).await
    }

    async fn list_tokens(&self, org: OrgId, account_id: i64) -> Result<Vec<TokenSummary>, ApiError> {
        let path = format!("/api/serviceaccounts/{}/tokens", account_id);
        self.execute(self.request(Method::GET, &path, Some(org))).await
    }

    async fn delete_token(&self, org: OrgId, account_id: i64, token_id: i64) -> Result<(), ApiError> {
        let path = format!("/api/serviceaccounts/{}/tokens/{}", account_id, token_id);
        self.execute_unit(self.request(Method::DELETE, &path, Some(org))).await
    }

    async fn create_token(&self, org: OrgId, account_id: i64, name: &str) -> Result<IssuedToken, ApiError> {
        let path = format!("/api/serviceaccounts/{}/tokens", account_id);
        let builder = self
            .request(Method::POST, &path, Some(org))
            .json(&json!({ "name": name }));
        self.execute(builder).await
    }

    async fn find_folder(&self, org: OrgId, title: &str) -> Result<Option<Folder>, ApiError> {
        let path = format!("/api/folders?limit={}", FOLDER_LIMIT);
        let folders: Vec<Folder> = self.execute(self.request(Method::GET, &path, Some(org))).await?;
        Ok(folders.into_iter().find(|folder| folder.title == title))
    }

    async fn create_folder(&self, org: OrgId, title: &str) -> Result<Folder, ApiError> {
        let builder = self
            .request(Method::POST, "/api/folders", Some(org))
            .json(&json!({ "title": title }));
        self.execute(builder).await
    }

    async fn import_dashboard(&self, org: OrgId, request: &ImportRequest) -> Result<(), ApiError> {
        let builder = self
            .request(Method::POST, "/api/dashboards/import", Some(org))
            .json(request);
        self.execute_unit(builder).await
    }
}
