//! Version test-visibility resolution.
//!
//! Decides which tests are shown for a client version: the template assigned
//! to the version, else the default template, else every enabled test. The
//! resolved key set is a hard filter over the catalog.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::db::DbPool;
use crate::entity::{client_version, template_version, test_category, test_template, test_type};
use crate::error::AppResult;
use crate::models::catalog::{
    AppliedTemplate, CategoryInfo, FALLBACK_TESTS, TestInfo, TestsResponse, UNCATEGORIZED,
    json_string_list,
};
use crate::models::template::{CoverageEntry, CoverageResponse, TemplateSource};

/// How a requested client version is matched when no row has that exact id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VersionMatchPolicy {
    /// Only the exact version id matches.
    #[default]
    Exact,
    /// Either string is a prefix of the other.
    Prefix,
    /// Either string contains the other.
    Contains,
}

impl VersionMatchPolicy {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "exact" => Some(Self::Exact),
            "prefix" => Some(Self::Prefix),
            "contains" | "substring" => Some(Self::Contains),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Prefix => "prefix",
            Self::Contains => "contains",
        }
    }

    /// Whether `candidate` is an acceptable non-exact match for `requested`.
    fn fallback_matches(&self, requested: &str, candidate: &str) -> bool {
        match self {
            Self::Exact => false,
            Self::Prefix => requested.starts_with(candidate) || candidate.starts_with(requested),
            Self::Contains => requested.contains(candidate) || candidate.contains(requested),
        }
    }
}

/// Find the client version row for a requested version string.
///
/// An exact match always wins. Otherwise the policy's candidates are ranked
/// by longest `version_id`, then lowest id, so the result never depends on
/// row order.
pub fn find_client_version<'a>(
    versions: &'a [client_version::Model],
    requested: &str,
    policy: VersionMatchPolicy,
) -> Option<&'a client_version::Model> {
    let requested = requested.trim();
    if requested.is_empty() {
        return None;
    }

    if let Some(exact) = versions.iter().find(|v| v.version_id == requested) {
        return Some(exact);
    }

    versions
        .iter()
        .filter(|v| !v.version_id.is_empty())
        .filter(|v| policy.fallback_matches(requested, &v.version_id))
        .min_by(|a, b| {
            b.version_id
                .len()
                .cmp(&a.version_id.len())
                .then(a.id.cmp(&b.id))
        })
}

/// Template chosen for a client version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTemplate {
    pub source: TemplateSource,
    pub template: Option<(i64, String)>,
    /// `None` when every test is allowed.
    pub keys: Option<HashSet<String>>,
}

impl ResolvedTemplate {
    pub fn all_enabled() -> Self {
        Self {
            source: TemplateSource::AllEnabled,
            template: None,
            keys: None,
        }
    }

    fn from_template(source: TemplateSource, template: &test_template::Model) -> Self {
        Self {
            source,
            template: Some((template.id, template.name.clone())),
            keys: Some(json_string_list(Some(&template.test_keys)).into_iter().collect()),
        }
    }

    pub fn allows(&self, test_key: &str) -> bool {
        self.keys.as_ref().is_none_or(|keys| keys.contains(test_key))
    }

    pub fn applied(&self) -> Option<AppliedTemplate> {
        self.template.as_ref().map(|(id, name)| AppliedTemplate {
            id: *id,
            name: name.clone(),
            source: self.source,
        })
    }
}

/// Pick the template for a (possibly unknown) client version.
pub fn resolve_template(
    templates: &[test_template::Model],
    assignments: &[template_version::Model],
    version: Option<&client_version::Model>,
) -> ResolvedTemplate {
    let assigned = version.and_then(|v| {
        assignments
            .iter()
            .find(|a| a.client_version_id == v.id)
            .and_then(|a| templates.iter().find(|t| t.id == a.template_id))
    });

    if let Some(template) = assigned {
        return ResolvedTemplate::from_template(TemplateSource::Assigned, template);
    }

    // Lowest id wins if more than one row claims to be default
    match templates
        .iter()
        .filter(|t| t.is_default)
        .min_by_key(|t| t.id)
    {
        Some(template) => ResolvedTemplate::from_template(TemplateSource::Default, template),
        None => ResolvedTemplate::all_enabled(),
    }
}

/// Result and report counts for one test key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TestedCounts {
    pub result_count: u64,
    pub report_count: u64,
}

pub type TestedIndex = HashMap<String, TestedCounts>;

/// Catalog rows the resolver filters.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub categories: Vec<test_category::Model>,
    pub tests: Vec<test_type::Model>,
}

/// Visible categories and their tests, both in display order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisibleTests {
    pub categories: Vec<CategoryInfo>,
    pub tests: Vec<TestInfo>,
}

impl VisibleTests {
    /// Tests keyed by category name, in category display order.
    pub fn grouped(&self) -> IndexMap<String, Vec<TestInfo>> {
        let mut grouped: IndexMap<String, Vec<TestInfo>> = self
            .categories
            .iter()
            .map(|c| (c.name.clone(), Vec::new()))
            .collect();
        for test in &self.tests {
            grouped
                .entry(test.category_name.clone())
                .or_default()
                .push(test.clone());
        }
        grouped.retain(|_, tests| !tests.is_empty());
        grouped
    }
}

fn annotate(test: &mut TestInfo, tested: Option<&TestedIndex>) {
    if let Some(index) = tested {
        let counts = index.get(&test.test_key).copied().unwrap_or_default();
        test.tested = Some(counts.result_count > 0);
        test.result_count = Some(counts.result_count);
        test.report_count = Some(counts.report_count);
    }
}

/// Filter and order the catalog for a resolved template.
///
/// Categories follow `sort_order` then id; tests within a category follow
/// `sort_order` then key. Tests whose category is missing are grouped under
/// a trailing "Uncategorized" entry. Categories without visible tests are
/// left out.
pub fn visible_tests(
    catalog: &Catalog,
    resolved: &ResolvedTemplate,
    include_disabled: bool,
    tested: Option<&TestedIndex>,
) -> VisibleTests {
    let mut categories: Vec<&test_category::Model> = catalog.categories.iter().collect();
    categories.sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then(a.id.cmp(&b.id)));

    let known: HashSet<i64> = categories.iter().map(|c| c.id).collect();

    let mut selected: Vec<&test_type::Model> = catalog
        .tests
        .iter()
        .filter(|t| include_disabled || t.is_enabled)
        .filter(|t| resolved.allows(&t.test_key))
        .collect();
    selected.sort_by(|a, b| {
        a.sort_order
            .cmp(&b.sort_order)
            .then_with(|| a.test_key.cmp(&b.test_key))
    });

    let to_info = |test: &test_type::Model, category_name: &str| {
        let mut info = TestInfo {
            test_key: test.test_key.clone(),
            name: test.name.clone(),
            description: test.description.clone(),
            category_id: test.category_id.filter(|id| known.contains(id)),
            category_name: category_name.to_string(),
            sort_order: test.sort_order,
            is_enabled: test.is_enabled,
            tested: None,
            result_count: None,
            report_count: None,
        };
        annotate(&mut info, tested);
        info
    };

    let mut visible = VisibleTests::default();

    for category in categories {
        let members: Vec<TestInfo> = selected
            .iter()
            .filter(|t| t.category_id == Some(category.id))
            .map(|t| to_info(t, &category.name))
            .collect();
        if members.is_empty() {
            continue;
        }
        visible.categories.push(CategoryInfo {
            id: Some(category.id),
            name: category.name.clone(),
            sort_order: category.sort_order,
        });
        visible.tests.extend(members);
    }

    let orphans: Vec<TestInfo> = selected
        .iter()
        .filter(|t| t.category_id.is_none_or(|id| !known.contains(&id)))
        .map(|t| to_info(t, UNCATEGORIZED))
        .collect();
    if !orphans.is_empty() {
        visible.categories.push(uncategorized(&visible.categories));
        visible.tests.extend(orphans);
    }

    visible
}

fn uncategorized(before: &[CategoryInfo]) -> CategoryInfo {
    CategoryInfo {
        id: None,
        name: UNCATEGORIZED.to_string(),
        sort_order: before.iter().map(|c| c.sort_order).max().unwrap_or(0) + 1,
    }
}

/// The built-in suite as a single "Uncategorized" group.
pub fn fallback_tests(tested: Option<&TestedIndex>) -> VisibleTests {
    let tests: Vec<TestInfo> = FALLBACK_TESTS
        .iter()
        .enumerate()
        .map(|(position, (key, name, description))| {
            let mut info = TestInfo {
                test_key: (*key).to_string(),
                name: (*name).to_string(),
                description: Some((*description).to_string()),
                category_id: None,
                category_name: UNCATEGORIZED.to_string(),
                sort_order: position as i32,
                is_enabled: true,
                tested: None,
                result_count: None,
                report_count: None,
            };
            annotate(&mut info, tested);
            info
        })
        .collect();

    VisibleTests {
        categories: vec![uncategorized(&[])],
        tests,
    }
}

/// Options for a tests listing.
#[derive(Debug, Clone, Default)]
pub struct TestsRequest {
    pub client_version: Option<String>,
    pub include_disabled: bool,
    pub include_tested: bool,
}

/// Build the tests listing for a client version.
///
/// Degrades to the built-in suite when the catalog tables are missing.
pub async fn list_tests(
    pool: &DbPool,
    request: &TestsRequest,
    policy: VersionMatchPolicy,
) -> AppResult<TestsResponse> {
    let requested = request
        .client_version
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty());

    let Some(catalog) = pool.load_catalog().await? else {
        warn!("Catalog tables missing, serving built-in test list");
        let tested = match (request.include_tested, requested) {
            (true, Some(version)) => Some(pool.tested_counts(&[version.to_string()]).await?),
            _ => None,
        };
        let visible = fallback_tests(tested.as_ref());
        return Ok(TestsResponse {
            success: true,
            client_version: requested.map(str::to_string),
            grouped: visible.grouped(),
            categories: visible.categories,
            tests: visible.tests,
            template: None,
            skip_tests: Vec::new(),
        });
    };

    let versions = pool.list_client_versions(true).await?;
    let version = requested.and_then(|r| find_client_version(&versions, r, policy));
    if let (Some(requested), Some(found)) = (requested, version)
        && found.version_id != requested
    {
        debug!(
            "Client version '{}' matched '{}' using {} policy",
            requested,
            found.version_id,
            policy.as_str()
        );
    }

    let tested = match (request.include_tested, requested) {
        (true, Some(requested)) => Some(
            pool.tested_counts(&tested_versions(requested, version))
                .await?,
        ),
        _ => None,
    };

    let templates = pool.list_templates().await?;
    let assignments = pool.list_template_assignments().await?;
    let resolved = resolve_template(&templates, &assignments, version);
    let visible = visible_tests(
        &catalog,
        &resolved,
        request.include_disabled,
        tested.as_ref(),
    );

    Ok(TestsResponse {
        success: true,
        client_version: version.map(|v| v.version_id.clone()),
        grouped: visible.grouped(),
        categories: visible.categories,
        tests: visible.tests,
        template: resolved.applied(),
        skip_tests: version
            .map(|v| json_string_list(v.skip_tests.as_ref()))
            .unwrap_or_default(),
    })
}

/// Versions whose reports count as results for a listing request: the
/// string the tool sent plus the version it matched, if different.
fn tested_versions(requested: &str, matched: Option<&client_version::Model>) -> Vec<String> {
    let mut versions = vec![requested.to_string()];
    if let Some(found) = matched
        && found.version_id != requested
    {
        versions.push(found.version_id.clone());
    }
    versions
}

/// Every enabled test flagged with template membership and results.
pub fn coverage_entries(
    catalog: &Catalog,
    template_keys: &HashSet<String>,
    tested: &TestedIndex,
) -> Vec<CoverageEntry> {
    visible_tests(catalog, &ResolvedTemplate::all_enabled(), false, Some(tested))
        .tests
        .into_iter()
        .map(|test| CoverageEntry {
            in_template: template_keys.contains(&test.test_key),
            tested: test.tested.unwrap_or(false),
            result_count: test.result_count.unwrap_or(0),
            report_count: test.report_count.unwrap_or(0),
            test_key: test.test_key,
            name: test.name,
            category_name: test.category_name,
        })
        .collect()
}

/// Coverage of a template for the given client versions.
pub async fn template_coverage(
    pool: &DbPool,
    template_id: i64,
    versions: Vec<String>,
) -> AppResult<CoverageResponse> {
    let template = pool.get_template(template_id).await?;
    let keys: HashSet<String> = json_string_list(Some(&template.test_keys))
        .into_iter()
        .collect();
    let catalog = pool.load_catalog().await?.unwrap_or_default();
    let tested = pool.tested_counts(&versions).await?;

    Ok(CoverageResponse {
        template_id,
        tests: coverage_entries(&catalog, &keys, &tested),
        versions,
    })
}
