// Organization domain model and federated tenant access
use std::collections::HashMap;

/// Numeric organization id assigned by the dashboard server
pub type OrgId = i64;

const SCOPE_SEPARATOR: char = '|';

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Organization {
    pub name: String,
    pub tenant_id: String,
}

impl Organization {
    pub fn new(name: impl Into<String>, tenant_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tenant_id: tenant_id.into(),
        }
    }
}

/// Maps an organization name to the ordered set of tenants its data sources may query.
///
/// Organizations without an entry only see their own tenant.
#[derive(Debug, Clone, Default)]
pub struct FederatedAccess {
    entries: HashMap<String, Vec<String>>,
}

impl FederatedAccess {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a pipe-delimited tenant list for an organization.
    /// Blank segments are dropped and repeated tenants keep their first position.
    pub fn grant(&mut self, org_name: impl Into<String>, tenants: &str) {
        let mut scope: Vec<String> = Vec::new();
        for tenant in tenants.split(SCOPE_SEPARATOR).map(str::trim) {
            if !tenant.is_empty() && !scope.iter().any(|t| t == tenant) {
                scope.push(tenant.to_string());
            }
        }
        self.entries.insert(org_name.into(), scope);
    }

    pub fn tenants_for(&self, org: &Organization) -> Vec<String> {
        match self.entries.get(&org.name) {
            Some(scope) if !scope.is_empty() => scope.clone(),
            _ => vec![org.tenant_id.clone()],
        }
    }

    /// Header value injected into every data source owned by `org`
    pub fn scope_for(&self, org: &Organization) -> String {
        self.tenants_for(org).join(&SCOPE_SEPARATOR.to_string())
    }
}
