//! Test template models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::catalog::json_string_list;

/// Name of the template created when no default exists.
pub const DEFAULT_TEMPLATE_NAME: &str = "Default (All Tests)";

/// How the template for a listing was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TemplateSource {
    /// Explicitly assigned to the client version
    Assigned,
    /// The global default template
    Default,
    /// No template exists; every enabled test is shown
    AllEnabled,
}

/// Template with the client versions assigned to it.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TemplateSummary {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub test_keys: Vec<String>,
    pub is_default: bool,
    pub is_system: bool,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version_ids: Vec<String>,
}

impl TemplateSummary {
    pub fn from_model(model: crate::entity::test_template::Model, version_ids: Vec<String>) -> Self {
        let test_keys = json_string_list(Some(&model.test_keys));
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            test_keys,
            is_default: model.is_default,
            is_system: model.is_system,
            created_by: model.created_by,
            created_at: model.created_at,
            updated_at: model.updated_at,
            version_ids,
        }
    }
}

/// Create or update a template.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct TemplateRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub test_keys: Vec<String>,
}

impl TemplateRequest {
    /// Trimmed, de-duplicated keys in first-seen order.
    pub fn normalized_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = Vec::with_capacity(self.test_keys.len());
        for key in self.test_keys.iter().map(|k| k.trim()) {
            if !key.is_empty() && !keys.iter().any(|k| k == key) {
                keys.push(key.to_string());
            }
        }
        keys
    }
}

/// Replace the set of client versions a template applies to.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct AssignVersionsRequest {
    pub version_ids: Vec<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct CoverageQuery {
    /// Comma separated client versions to check for existing results
    pub versions: Option<String>,
}

impl CoverageQuery {
    pub fn version_list(&self) -> Vec<String> {
        self.versions
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// One enabled test in a template coverage listing.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CoverageEntry {
    pub test_key: String,
    pub name: String,
    pub category_name: String,
    pub in_template: bool,
    pub tested: bool,
    pub result_count: u64,
    pub report_count: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CoverageResponse {
    pub template_id: i64,
    pub versions: Vec<String>,
    pub tests: Vec<CoverageEntry>,
}
