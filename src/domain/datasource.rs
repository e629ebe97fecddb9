// Data source domain model
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSourceKind {
    Metrics,
    Logs,
    Traces,
}

impl DataSourceKind {
    pub const ALL: [DataSourceKind; 3] = [Self::Metrics, Self::Logs, Self::Traces];

    /// Plugin type the dashboard server uses for this backend
    pub fn plugin_type(self) -> &'static str {
        match self {
            Self::Metrics => "prometheus",
            Self::Logs => "loki",
            Self::Traces => "tempo",
        }
    }

    pub fn from_plugin_type(plugin_type: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.plugin_type().eq_ignore_ascii_case(plugin_type))
    }

    pub fn default_name(self) -> &'static str {
        match self {
            Self::Metrics => "Mimir",
            Self::Logs => "Loki",
            Self::Traces => "Tempo",
        }
    }
}

/// A backend every organization gets a data source for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataSourceTarget {
    pub kind: DataSourceKind,
    pub name: String,
    pub url: String,
}

impl DataSourceTarget {
    pub fn scoped(&self, tenant_scope: impl Into<String>) -> DataSourceSpec {
        DataSourceSpec {
            name: self.name.clone(),
            kind: self.kind,
            url: self.url.clone(),
            tenant_scope: tenant_scope.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataSourceSpec {
    pub name: String,
    pub kind: DataSourceKind,
    pub url: String,
    pub tenant_scope: String,
}

impl DataSourceSpec {
    /// Builds the request body. The tenant scope travels as a proxied header,
    /// so the gateway enforces isolation rather than the query.
    pub fn to_payload(&self, tenant_header: &str) -> DataSourcePayload {
        DataSourcePayload {
            name: self.name.clone(),
            plugin_type: self.kind.plugin_type().to_string(),
            url: self.url.clone(),
            access: "proxy".to_string(),
            is_default: self.kind == DataSourceKind::Metrics,
            json_data: HeaderJsonData {
                http_header_name1: tenant_header.to_string(),
            },
            secure_json_data: HeaderSecureJsonData {
                http_header_value1: self.tenant_scope.clone(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSourcePayload {
    pub name: String,
    #[serde(rename = "type")]
    pub plugin_type: String,
    pub url: String,
    pub access: String,
    pub is_default: bool,
    pub json_data: HeaderJsonData,
    pub secure_json_data: HeaderSecureJsonData,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderJsonData {
    #[serde(rename = "httpHeaderName1")]
    pub http_header_name1: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderSecureJsonData {
    #[serde(rename = "httpHeaderValue1")]
    pub http_header_value1: String,
}
