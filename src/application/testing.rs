// In-memory doubles for the external collaborators
use crate::application::dashboard_fetcher::{DashboardFetcher, FetchError};
use crate::application::grafana_api::{
    ApiError, ExistingDataSource, Folder, GrafanaApi, ImportRequest, IssuedToken, OrgSummary, ServiceAccount,
    TokenSummary,
};
use crate::domain::dashboard::{DashboardDocument, DashboardSource};
use crate::domain::datasource::DataSourcePayload;
use crate::domain::organization::OrgId;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Mutex;

#[derive(Default)]
struct State {
    next_id: i64,
    orgs: Vec<OrgSummary>,
    scans: usize,
    data_sources: Vec<(OrgId, i64, DataSourcePayload)>,
    accounts: Vec<(OrgId, ServiceAccount)>,
    tokens: Vec<(OrgId, i64, TokenSummary)>,
    folders: Vec<(OrgId, Folder)>,
    imports: Vec<(OrgId, ImportRequest)>,
    failing_imports: Vec<OrgId>,
    failing_token_minting: bool,
}

impl State {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Default)]
pub struct FakeGrafana {
    state: Mutex<State>,
    broken_name_lookup: bool,
    failing_data_source: Option<String>,
}

impl FakeGrafana {
    pub fn new() -> Self {
        Self::default()
    }

    /// Name lookups always miss, as some server versions do for renamed orgs
    pub fn with_broken_name_lookup(mut self) -> Self {
        self.broken_name_lookup = true;
        self
    }

    pub fn with_failing_data_source(mut self, name: &str) -> Self {
        self.failing_data_source = Some(name.to_string());
        self
    }

    pub fn fail_imports_for(&self, org: OrgId) {
        self.state.lock().unwrap().failing_imports.push(org);
    }

    pub fn fail_token_minting(&self) {
        self.state.lock().unwrap().failing_token_minting = true;
    }

    pub fn seed_org(&self, name: &str) -> OrgId {
        let mut state = self.state.lock().unwrap();
        let id = state.next_id();
        state.orgs.push(OrgSummary { id, name: name.to_string() });
        id
    }

    pub fn org_count(&self) -> usize {
        self.state.lock().unwrap().orgs.len()
    }

    pub fn scan_count(&self) -> usize {
        self.state.lock().unwrap().scans
    }

    pub fn data_source_count(&self, org: OrgId) -> usize {
        let state = self.state.lock().unwrap();
        state.data_sources.iter().filter(|(o, _, _)| *o == org).count()
    }

    pub fn data_source(&self, org: OrgId, name: &str) -> Option<DataSourcePayload> {
        let state = self.state.lock().unwrap();
        state
            .data_sources
            .iter()
            .find(|(o, _, payload)| *o == org && payload.name == name)
            .map(|(_, _, payload)| payload.clone())
    }

    pub fn data_source_ids(&self) -> Vec<(OrgId, String, i64)> {
        let state = self.state.lock().unwrap();
        state
            .data_sources
            .iter()
            .map(|(org, id, payload)| (*org, payload.name.clone(), *id))
            .collect()
    }

    pub fn data_source_payloads(&self) -> Vec<DataSourcePayload> {
        let state = self.state.lock().unwrap();
        state.data_sources.iter().map(|(_, _, payload)| payload.clone()).collect()
    }

    pub fn service_account_count(&self) -> usize {
        self.state.lock().unwrap().accounts.len()
    }

    pub fn live_token_count(&self, org: OrgId) -> usize {
        let state = self.state.lock().unwrap();
        state.tokens.iter().filter(|(o, _, _)| *o == org).count()
    }

    pub fn folder_uid(&self, org: OrgId, title: &str) -> Option<String> {
        let state = self.state.lock().unwrap();
        state
            .folders
            .iter()
            .find(|(o, folder)| *o == org && folder.title == title)
            .map(|(_, folder)| folder.uid.clone())
    }

    pub fn folder_count(&self, org: OrgId) -> usize {
        let state = self.state.lock().unwrap();
        state.folders.iter().filter(|(o, _)| *o == org).count()
    }

    pub fn imports(&self) -> Vec<(OrgId, ImportRequest)> {
        self.state.lock().unwrap().imports.clone()
    }

    fn require_org(state: &State, org: OrgId) -> Result<(), ApiError> {
        if state.orgs.iter().any(|o| o.id == org) {
            Ok(())
        } else {
            Err(ApiError::Status {
                status: 401,
                body: format!("unknown org {}", org),
            })
        }
    }
}

#[async_trait]
impl GrafanaApi for FakeGrafana {
    async fn health(&self) -> Result<(), ApiError> {
        Ok(())
    }

    async fn create_org(&self, name: &str) -> Result<OrgId, ApiError> {
        let mut state = self.state.lock().unwrap();
        if state.orgs.iter().any(|o| o.name == name) {
            return Err(ApiError::Conflict(format!("organization '{}'", name)));
        }
        let id = state.next_id();
        state.orgs.push(OrgSummary { id, name: name.to_string() });
        Ok(id)
    }

    async fn find_org_by_name(&self, name: &str) -> Result<Option<OrgSummary>, ApiError> {
        if self.broken_name_lookup {
            return Ok(None);
        }
        let state = self.state.lock().unwrap();
        Ok(state.orgs.iter().find(|o| o.name == name).cloned())
    }

    async fn list_orgs(&self) -> Result<Vec<OrgSummary>, ApiError> {
        let mut state = self.state.lock().unwrap();
        state.scans += 1;
        Ok(state.orgs.clone())
    }

    async fn find_data_source(&self, org: OrgId, name: &str) -> Result<Option<ExistingDataSource>, ApiError> {
        let state = self.state.lock().unwrap();
        Self::require_org(&state, org)?;
        Ok(state
            .data_sources
            .iter()
            .find(|(o, _, payload)| *o == org && payload.name == name)
            .map(|(_, id, _)| ExistingDataSource { id: *id }))
    }

    async fn create_data_source(&self, org: OrgId, payload: &DataSourcePayload) -> Result<(), ApiError> {
        let mut state = self.state.lock().unwrap();
        Self::require_org(&state, org)?;
        if self.failing_data_source.as_deref() == Some(payload.name.as_str()) {
            return Err(ApiError::Status {
                status: 500,
                body: "plugin unavailable".to_string(),
            });
        }
        if state.data_sources.iter().any(|(o, _, p)| *o == org && p.name == payload.name) {
            return Err(ApiError::Conflict(format!("data source '{}'", payload.name)));
        }
        let id = state.next_id();
        state.data_sources.push((org, id, payload.clone()));
        Ok(())
    }

    async fn update_data_source(&self, org: OrgId, id: i64, payload: &DataSourcePayload) -> Result<(), ApiError> {
        let mut state = self.state.lock().unwrap();
        let entry = state
            .data_sources
            .iter_mut()
            .find(|(o, existing, _)| *o == org && *existing == id)
            .ok_or_else(|| ApiError::NotFound(format!("data source {}", id)))?;
        entry.2 = payload.clone();
        Ok(())
    }

    async fn find_service_account(&self, org: OrgId, name: &str) -> Result<Option<ServiceAccount>, ApiError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .accounts
            .iter()
            .find(|(o, account)| *o == org && account.name == name)
            .map(|(_, account)| account.clone()))
    }

    async fn create_service_account(&self, org: OrgId, name: &str, _role: &str) -> Result<ServiceAccount, ApiError> {
        let mut state = self.state.lock().unwrap();
        Self::require_org(&state, org)?;
        let account = ServiceAccount {
            id: state.next_id(),
            name: name.to_string(),
        };
        state.accounts.push((org, account.clone()));
        Ok(account)
    }

    async fn list_tokens(&self, org: OrgId, account_id: i64) -> Result<Vec<TokenSummary>, ApiError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .tokens
            .iter()
            .filter(|(o, account, _)| *o == org && *account == account_id)
            .map(|(_, _, token)| token.clone())
            .collect())
    }

    async fn delete_token(&self, org: OrgId, account_id: i64, token_id: i64) -> Result<(), ApiError> {
        let mut state = self.state.lock().unwrap();
        let before = state.tokens.len();
        state
            .tokens
            .retain(|(o, account, token)| !(*o == org && *account == account_id && token.id == token_id));
        if state.tokens.len() == before {
            return Err(ApiError::NotFound(format!("token {}", token_id)));
        }
        Ok(())
    }

    async fn create_token(&self, org: OrgId, account_id: i64, name: &str) -> Result<IssuedToken, ApiError> {
        let mut state = self.state.lock().unwrap();
        if state.failing_token_minting {
            return Err(ApiError::Status {
                status: 500,
                body: "token store unavailable".to_string(),
            });
        }
        let id = state.next_id();
        state.tokens.push((org, account_id, TokenSummary { id, name: name.to_string() }));
        Ok(IssuedToken {
            id,
            name: name.to_string(),
            key: format!("glsa_fake_{}", id),
        })
    }

    async fn find_folder(&self, org: OrgId, title: &str) -> Result<Option<Folder>, ApiError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .folders
            .iter()
            .find(|(o, folder)| *o == org && folder.title == title)
            .map(|(_, folder)| folder.clone()))
    }

    async fn create_folder(&self, org: OrgId, title: &str) -> Result<Folder, ApiError> {
        let mut state = self.state.lock().unwrap();
        let folder = Folder {
            uid: format!("folder-{}", state.next_id()),
            title: title.to_string(),
        };
        state.folders.push((org, folder.clone()));
        Ok(folder)
    }

    async fn import_dashboard(&self, org: OrgId, request: &ImportRequest) -> Result<(), ApiError> {
        let mut state = self.state.lock().unwrap();
        Self::require_org(&state, org)?;
        if state.failing_imports.contains(&org) {
            return Err(ApiError::Status {
                status: 412,
                body: "version-mismatch".to_string(),
            });
        }
        state.imports.push((org, request.clone()));
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeFetcher {
    documents: Vec<(DashboardSource, Result<Value, u16>)>,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, source: DashboardSource, body: Value) -> Self {
        self.documents.push((source, Ok(body)));
        self
    }

    pub fn with_status(mut self, source: DashboardSource, status: u16) -> Self {
        self.documents.push((source, Err(status)));
        self
    }
}

#[async_trait]
impl DashboardFetcher for FakeFetcher {
    async fn fetch(&self, source: &DashboardSource) -> Result<DashboardDocument, FetchError> {
        let location = source.to_string();
        match self.documents.iter().find(|(s, _)| s == source) {
            Some((_, Ok(body))) => Ok(DashboardDocument::new(body.clone())),
            Some((_, Err(status))) => Err(FetchError::Status {
                location,
                status: *status,
            }),
            None => Err(FetchError::Unreachable {
                location,
                reason: "connection refused".to_string(),
            }),
        }
    }
}
