// Dashboard domain model and import input resolution
use super::datasource::DataSourceKind;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashMap;

const INPUTS_KEY: &str = "__inputs";
const DATASOURCE_INPUT: &str = "datasource";
const CONSTANT_INPUT: &str = "constant";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashboardSource {
    /// Revision published in the public dashboard catalog
    Catalog(u64),
    /// Document hosted at an arbitrary URL
    Url(String),
}

impl std::fmt::Display for DashboardSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Catalog(id) => write!(f, "catalog #{}", id),
            Self::Url(url) => f.write_str(url),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardDefinition {
    pub source: DashboardSource,
    pub name: String,
    pub folder: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardGroup {
    pub dashboards: Vec<DashboardDefinition>,
    pub orgs: Vec<String>,
}

/// Raw dashboard document as fetched
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardDocument {
    body: Value,
}

impl DashboardDocument {
    pub fn new(body: Value) -> Self {
        Self { body }
    }

    /// External input placeholders declared by the document. Entries without a
    /// name are ignored; other malformed entries come back with an empty type so
    /// they are reported as unresolved.
    pub fn declared_inputs(&self) -> Vec<InputPlaceholder> {
        self.body
            .get(INPUTS_KEY)
            .and_then(Value::as_array)
            .map(|inputs| {
                inputs
                    .iter()
                    .filter_map(|input| {
                        serde_json::from_value(input.clone()).ok().or_else(|| {
                            let name = input.get("name")?.as_str()?;
                            Some(InputPlaceholder {
                                name: name.to_string(),
                                input_type: String::new(),
                                plugin_id: None,
                                value: None,
                            })
                        })
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Body ready for import, with the catalog's internal id cleared so the
    /// server always creates its own entity.
    pub fn into_importable(self) -> Value {
        let mut body = self.body;
        if let Some(object) = body.as_object_mut() {
            object.insert("id".to_string(), Value::Null);
        }
        body
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputPlaceholder {
    pub name: String,
    #[serde(rename = "type", default)]
    pub input_type: String,
    #[serde(default)]
    pub plugin_id: Option<String>,
    #[serde(default, deserialize_with = "scalar_as_string")]
    pub value: Option<String>,
}

/// Constants may declare numbers or booleans; the import API takes strings.
fn scalar_as_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(value)) => Some(value),
        Some(Value::Number(value)) => Some(value.to_string()),
        Some(Value::Bool(value)) => Some(value.to_string()),
        _ => None,
    })
}

/// Concrete substitution supplied with an import request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InputBinding {
    pub name: String,
    #[serde(rename = "type")]
    pub input_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plugin_id: Option<String>,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputResolution {
    pub bindings: Vec<InputBinding>,
    /// Placeholder names no data source could be chosen for
    pub unresolved: Vec<String>,
}

/// Maps declared placeholders onto the provisioned data source names
#[derive(Debug, Clone)]
pub struct InputResolver {
    names: HashMap<DataSourceKind, String>,
    metrics_overrides: Vec<String>,
}

impl InputResolver {
    pub fn new(names: HashMap<DataSourceKind, String>, metrics_overrides: Vec<String>) -> Self {
        Self {
            names,
            metrics_overrides,
        }
    }

    fn data_source_name(&self, kind: DataSourceKind) -> String {
        self.names
            .get(&kind)
            .cloned()
            .unwrap_or_else(|| kind.default_name().to_string())
    }

    pub fn resolve(&self, placeholders: &[InputPlaceholder]) -> InputResolution {
        let mut resolution = InputResolution::default();

        for placeholder in placeholders {
            match placeholder.input_type.as_str() {
                DATASOURCE_INPUT => {
                    // Some dashboards name their metrics variable without a usable plugin id
                    let kind = if self.metrics_overrides.iter().any(|n| n == &placeholder.name) {
                        Some(DataSourceKind::Metrics)
                    } else {
                        placeholder
                            .plugin_id
                            .as_deref()
                            .and_then(DataSourceKind::from_plugin_type)
                    };

                    match kind {
                        Some(kind) => resolution.bindings.push(InputBinding {
                            name: placeholder.name.clone(),
                            input_type: DATASOURCE_INPUT.to_string(),
                            plugin_id: Some(kind.plugin_type().to_string()),
                            value: self.data_source_name(kind),
                        }),
                        None => resolution.unresolved.push(placeholder.name.clone()),
                    }
                }
                CONSTANT_INPUT => match &placeholder.value {
                    Some(value) => resolution.bindings.push(InputBinding {
                        name: placeholder.name.clone(),
                        input_type: CONSTANT_INPUT.to_string(),
                        plugin_id: None,
                        value: value.clone(),
                    }),
                    None => resolution.unresolved.push(placeholder.name.clone()),
                },
                _ => resolution.unresolved.push(placeholder.name.clone()),
            }
        }

        resolution
    }
}
