// Tenant bootstrap records
use super::organization::OrgId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// What bootstrap remembers about one organization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantRecord {
    pub org_id: OrgId,
    pub tenant_id: String,
    pub token: Option<String>,
}

/// Keyed by organization name
pub type BootstrapResults = BTreeMap<String, TenantRecord>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceAccountPolicy {
    pub name: String,
    pub role: String,
    pub token_prefix: String,
    /// Revoke earlier tokens carrying `token_prefix` before minting a new one
    pub revoke_previous_tokens: bool,
}

impl ServiceAccountPolicy {
    pub fn token_name(&self, issued_at: chrono::DateTime<chrono::Utc>) -> String {
        format!("{}-{}", self.token_prefix, issued_at.format("%Y%m%d%H%M%S%3f"))
    }

    pub fn owns_token(&self, token_name: &str) -> bool {
        token_name
            .strip_prefix(&self.token_prefix)
            .is_some_and(|rest| rest.starts_with('-'))
    }
}
