// Boundary trait for the dashboard server's admin API
use crate::domain::dashboard::InputBinding;
use crate::domain::datasource::DataSourcePayload;
use crate::domain::organization::OrgId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("dashboard server unreachable: {0}")]
    Unreachable(String),
    #[error("{0} already exists")]
    Conflict(String),
    #[error("{0} not found")]
    NotFound(String),
    #[error("request failed with status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("unexpected response: {0}")]
    Decode(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OrgSummary {
    pub id: OrgId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExistingDataSource {
    pub id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServiceAccount {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenSummary {
    pub id: i64,
    pub name: String,
}

#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct IssuedToken {
    pub id: i64,
    pub name: String,
    pub key: String,
}

impl std::fmt::Debug for IssuedToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IssuedToken")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("key", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Folder {
    pub uid: String,
    pub title: String,
}

/// Body of a dashboard import call
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRequest {
    pub dashboard: Value,
    pub overwrite: bool,
    pub inputs: Vec<InputBinding>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder_uid: Option<String>,
}

impl ImportRequest {
    pub fn new(dashboard: Value, inputs: Vec<InputBinding>) -> Self {
        Self {
            dashboard,
            overwrite: true,
            inputs,
            folder_uid: None,
        }
    }

    pub fn in_folder(&self, folder_uid: Option<String>) -> Self {
        Self {
            folder_uid,
            ..self.clone()
        }
    }
}

/// Every org-scoped call carries the target organization as request context.
#[async_trait]
pub trait GrafanaApi: Send + Sync {
    async fn health(&self) -> Result<(), ApiError>;

    /// Returns `ApiError::Conflict` when the name is taken
    async fn create_org(&self, name: &str) -> Result<OrgId, ApiError>;

    async fn find_org_by_name(&self, name: &str) -> Result<Option<OrgSummary>, ApiError>;

    async fn list_orgs(&self) -> Result<Vec<OrgSummary>, ApiError>;

    async fn find_data_source(&self, org: OrgId, name: &str) -> Result<Option<ExistingDataSource>, ApiError>;

    async fn create_data_source(&self, org: OrgId, payload: &DataSourcePayload) -> Result<(), ApiError>;

    async fn update_data_source(&self, org: OrgId, id: i64, payload: &DataSourcePayload) -> Result<(), ApiError>;

    async fn find_service_account(&self, org: OrgId, name: &str) -> Result<Option<ServiceAccount>, ApiError>;

    async fn create_service_account(&self, org: OrgId, name: &str, role: &str) -> Result<ServiceAccount, ApiError>;

    async fn list_tokens(&self, org: OrgId, account_id: i64) -> Result<Vec<TokenSummary>, ApiError>;

    async fn delete_token(&self, org: OrgId, account_id: i64, token_id: i64) -> Result<(), ApiError>;

    async fn create_token(&self, org: OrgId, account_id: i64, name: &str) -> Result<IssuedToken, ApiError>;

    async fn find_folder(&self, org: OrgId, title: &str) -> Result<Option<Folder>, ApiError>;

    async fn create_folder(&self, org: OrgId, title: &str) -> Result<Folder, ApiError>;

    async fn import_dashboard(&self, org: OrgId, request: &ImportRequest) -> Result<(), ApiError>;
}
