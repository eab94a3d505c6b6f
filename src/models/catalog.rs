//! Test catalog models: categories, test definitions and client versions.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::template::TemplateSource;

/// Group name for tests without a known category.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Built-in test suite served when the catalog tables are missing.
///
/// Tuples of (test key, name, description).
pub const FALLBACK_TESTS: &[(&str, &str, &str)] = &[
    ("1", "Run the Steam.exe", "Client downloads, updates and presents the Welcome window"),
    ("2", "Create a new account", "Account is created and automatically logged into, no errors in the Steam client logs. Email is sent if SMTP is enabled"),
    ("2a", "Steam Subscriber Agreement displayed", "The SSA is shown during account creation"),
    ("2b", "Choose unique account name", "Wizard proceeds to the email address page"),
    ("2c", "Choose in-use account name", "Wizard shows alternative account names"),
    ("2d", "Enter a unique email address", "Wizard proceeds to security question"),
    ("2e", "Enter an existing email address", "Wizard prompts to find an existing account"),
    ("2f", "Steam account information is displayed", "Information is correct and all images displayed"),
    ("3", "Log into an existing account", "Client logs in and the main window is displayed"),
    ("4", "Log into an existing account made in an earlier client version", "Client logs in and the main window is displayed"),
    ("5", "Change password", "Client will only change password with correct information. Email is sent if SMTP is enabled"),
    ("6", "Change secret question answer", "Client will only change secret answer with correct information. Email is sent if SMTP is enabled"),
    ("7", "Change email address", "Email address on account is changed. Email is sent if SMTP is enabled"),
    ("8", "Add a non-Steam game", "Game shortcut is displayed in the My Games window"),
    ("9", "Purchase a game via Credit Card", "Purchase wizard shows and completes the transaction. My Games list updates with the added game(s). Check login still works"),
    ("10", "Activate a product on Steam", "CD-Key activation wizard shows and adds the game(s) to the My Games list. Check login still works"),
    ("11", "Download a game", "Game downloads and displays as installed in the My Games list"),
    ("12a", "GoldSrc Steam server browser", "Steam server browser shows running GoldSrc multiplayer games and/or HLTV sessions"),
    ("12b", "GoldSrc in-game server browser", "In-game server browser shows running GoldSrc multiplayer games"),
    ("12c", "GoldSrc Steam ticket validation", "GoldSrc server validates Steam ticket successfully"),
    ("12d", "Source Steam server browser", "Steam server browser shows running Source multiplayer games and/or HLTV sessions"),
    ("12e", "Source in-game server browser", "In-game server browser shows running Source multiplayer games"),
    ("12f", "Source Steam ticket validation", "Source server validates Steam ticket successfully"),
    ("13", "Account retrieval", "Account can be accessed via several methods"),
    ("14a", "Forgot password using email", "Email is sent if SMTP is enabled; this requires the correct validation code. Non-SMTP should accept any code"),
    ("14b", "Forgot password using CD key", "Password is reset when provided with a CD key registered on the account"),
    ("14c", "Forgot password using secret question", "Password is reset when provided with the correct secret question answer"),
    ("15", "Add a subscription", "Subscription list updates and game appears in My Games"),
    ("16", "Remove a subscription", "The My Games list is updated with the removal of the game(s)"),
    ("17", "Delete user", "The user is removed from the server"),
    ("18", "Tracker Friends - Login", "Tracker Friends service accepts login and displays friends list"),
    ("19", "Tracker Friends - Add Friend", "Friend is added and appears in friends list"),
    ("20", "Tracker Friends - Chat", "Chat messages can be sent and received between friends"),
    ("21", "Tracker Friends - Change Status", "User status is updated for all users"),
    ("22", "Tracker Friends - Play Minigame", "Minigame launches and can be played with friends"),
    ("23", "Tracker Friends - Remove Friend", "Friend is removed from friends list"),
    ("24", "CM Friends - Login", "CM Friends service accepts login and displays friends list"),
    ("25", "CM Friends - Add Friend", "Friend is added and appears in friends list"),
    ("26", "CM Friends - Chat", "Chat messages can be sent and received between friends"),
    ("27", "CM Friends - Change Status", "User status is updated for all users"),
    ("28", "CM Friends - Remove Friend", "Friend is removed from friends list"),
];

/// Category as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct CategoryInfo {
    /// `None` for the synthetic "Uncategorized" group
    pub id: Option<i64>,
    pub name: String,
    pub sort_order: i32,
}

/// A visible test with its display metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct TestInfo {
    pub test_key: String,
    pub name: String,
    pub description: Option<String>,
    pub category_id: Option<i64>,
    pub category_name: String,
    pub sort_order: i32,
    pub is_enabled: bool,
    /// Whether results exist for the requested versions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tested: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_count: Option<u64>,
}

/// Template applied to a tests listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct AppliedTemplate {
    pub id: i64,
    pub name: String,
    pub source: TemplateSource,
}

/// Query parameters for the tests listing.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct TestsQuery {
    /// Client version whose template decides visibility
    pub client_version: Option<String>,
    /// `1` to include disabled tests
    pub all: Option<String>,
    /// `1` to annotate tests with existing results
    pub include_tested: Option<String>,
}

/// Response for `GET /tests`.
#[derive(Debug, Serialize, ToSchema)]
pub struct TestsResponse {
    pub success: bool,
    /// Matched client version, if any
    pub client_version: Option<String>,
    pub categories: Vec<CategoryInfo>,
    pub tests: Vec<TestInfo>,
    /// Tests keyed by category name, in category order
    #[schema(value_type = Object)]
    pub grouped: IndexMap<String, Vec<TestInfo>>,
    /// `null` when every enabled test is shown
    pub template: Option<AppliedTemplate>,
    /// Keys testers should mark N/A for this version
    pub skip_tests: Vec<String>,
}

/// Client version as returned by the API.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct VersionInfo {
    pub id: i64,
    pub version_id: String,
    pub display_name: Option<String>,
    pub sort_order: i32,
    pub is_enabled: bool,
    pub skip_tests: Vec<String>,
}

impl From<crate::entity::client_version::Model> for VersionInfo {
    fn from(model: crate::entity::client_version::Model) -> Self {
        let skip_tests = json_string_list(model.skip_tests.as_ref());
        Self {
            id: model.id,
            version_id: model.version_id,
            display_name: model.display_name,
            sort_order: model.sort_order,
            is_enabled: model.is_enabled,
            skip_tests,
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct VersionsQuery {
    /// `1` to include disabled versions
    pub all: Option<String>,
}

/// Create or update a client version, keyed by `version_id`.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpsertVersionRequest {
    pub version_id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default = "default_true")]
    pub is_enabled: bool,
    #[serde(default)]
    pub skip_tests: Vec<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateCategoryRequest {
    pub name: String,
    #[serde(default)]
    pub sort_order: i32,
}

/// Create or update a test definition, keyed by `test_key`.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpsertTestTypeRequest {
    pub test_key: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category_id: Option<i64>,
    #[serde(default = "default_true")]
    pub is_enabled: bool,
    #[serde(default)]
    pub sort_order: i32,
}

fn default_true() -> bool {
    true
}

/// True for the `1`/`true` query flags used by the listing endpoints.
pub fn flag_enabled(value: Option<&str>) -> bool {
    matches!(value.map(str::trim), Some("1") | Some("true") | Some("yes"))
}

/// Read a JSON array of strings, ignoring non-string members.
///
/// A missing value or a value that is not an array yields an empty list.
pub fn json_string_list(value: Option<&serde_json::Value>) -> Vec<String> {
    match value {
        Some(serde_json::Value::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                serde_json::Value::String(s) => Some(s.clone()),
                serde_json::Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect(),
        // Older rows stored the list as an encoded JSON string
        Some(serde_json::Value::String(raw)) => serde_json::from_str::<serde_json::Value>(raw)
            .ok()
            .filter(|v| v.is_array())
            .map(|v| json_string_list(Some(&v)))
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}
