//! Report submission models.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::status::TestStatus;

/// Session metadata sent by the test tool.
///
/// Unknown fields are tolerated: older tool versions send extra keys here.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct SubmitMeta {
    #[serde(default)]
    pub tester: Option<String>,
    #[serde(default)]
    pub commit: Option<String>,
    #[serde(default, rename = "WAN")]
    pub wan: bool,
    #[serde(default, rename = "LAN")]
    pub lan: bool,
}

impl SubmitMeta {
    /// Network setup label stored on each report.
    pub fn test_type(&self) -> &'static str {
        match (self.wan, self.lan) {
            (true, true) => "WAN+LAN",
            (true, false) => "WAN",
            (false, true) => "LAN",
            (false, false) => "Unknown",
        }
    }

    pub fn tester_name(&self) -> String {
        self.tester
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or("Unknown")
            .to_string()
    }

    pub fn commit_hash(&self) -> Option<String> {
        self.commit
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
    }
}

/// Result for one test in a submission.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct ResultEntry {
    /// Empty when the tester left the test unanswered
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Session document posted to `/submit`.
///
/// This is the tool's whole session file, so keys the panel does not read
/// are tolerated.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SubmitReportRequest {
    #[serde(default)]
    pub meta: SubmitMeta,
    /// Client version -> test key -> result
    pub results: BTreeMap<String, BTreeMap<String, ResultEntry>>,
    /// Seconds spent per client version
    #[serde(default)]
    pub timing: Option<BTreeMap<String, u64>>,
    /// Completion flag per client version
    #[serde(default)]
    pub completed: Option<BTreeMap<String, bool>>,
    /// Client version -> log attachment descriptors; accepted and ignored
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub attached_logs: Option<BTreeMap<String, Vec<serde_json::Value>>>,
    /// Client version -> content hash computed by the tool
    #[serde(default)]
    pub upload_hashes: Option<BTreeMap<String, String>>,
    /// Client version -> package details the tool resolved
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub version_packages: Option<BTreeMap<String, serde_json::Value>>,
}

/// Validated results for one client version, ready to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionSubmission {
    pub client_version: String,
    pub results: Vec<ValidatedResult>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedResult {
    pub test_key: String,
    pub status: TestStatus,
    pub notes: Option<String>,
}

impl SubmitReportRequest {
    /// Check every status and collect the results per version.
    ///
    /// Empty statuses are skipped. Any unknown status, or two answered keys
    /// that are equal once trimmed, rejects the whole submission so nothing
    /// is written.
    pub fn validate(&self) -> Result<Vec<VersionSubmission>, String> {
        if self.results.is_empty() {
            return Err("No results in submission".to_string());
        }

        let mut submissions = Vec::with_capacity(self.results.len());
        for (client_version, tests) in &self.results {
            let client_version = client_version.trim();
            if client_version.is_empty() {
                return Err("Client version must not be empty".to_string());
            }

            let mut results = Vec::with_capacity(tests.len());
            let mut seen = BTreeSet::new();
            for (test_key, entry) in tests {
                let raw = entry.status.trim();
                if raw.is_empty() {
                    continue;
                }

                let key = test_key.trim();
                if key.is_empty() {
                    return Err(format!("Empty test key on {}", client_version));
                }
                if !seen.insert(key) {
                    return Err(format!(
                        "Duplicate test key '{}' on {}",
                        key, client_version
                    ));
                }
                let status = TestStatus::parse(raw).ok_or_else(|| {
                    format!(
                        "Unknown status '{}' for test {} on {}",
                        raw, key, client_version
                    )
                })?;
                results.push(ValidatedResult {
                    test_key: key.to_string(),
                    status,
                    notes: entry
                        .notes
                        .as_deref()
                        .map(str::trim)
                        .filter(|n| !n.is_empty())
                        .map(str::to_string),
                });
            }

            submissions.push(VersionSubmission {
                client_version: client_version.to_string(),
                results,
            });
        }

        Ok(submissions)
    }
}

/// One created report in a submit response.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CreatedReport {
    pub report_id: i64,
    pub client_version: String,
    pub tests_recorded: usize,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SubmitResponse {
    pub success: bool,
    pub reports: Vec<CreatedReport>,
}

/// Default page size for report listings.
pub const DEFAULT_REPORT_LIMIT: u64 = 50;
pub const MAX_REPORT_LIMIT: u64 = 500;

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ReportsQuery {
    /// Exact tester name
    pub tester: Option<String>,
    /// Exact client version
    pub version: Option<String>,
    /// Network setup label, e.g. `WAN`
    #[serde(rename = "type")]
    pub test_type: Option<String>,
    /// Maximum rows, newest first
    pub limit: Option<u64>,
}

/// Normalized filters for a report listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportFilter {
    pub tester: Option<String>,
    pub client_version: Option<String>,
    pub test_type: Option<String>,
    pub limit: u64,
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl ReportsQuery {
    pub fn filter(&self) -> ReportFilter {
        ReportFilter {
            tester: non_empty(self.tester.as_deref()),
            client_version: non_empty(self.version.as_deref()),
            test_type: non_empty(self.test_type.as_deref()),
            limit: self
                .limit
                .unwrap_or(DEFAULT_REPORT_LIMIT)
                .clamp(1, MAX_REPORT_LIMIT),
        }
    }
}

/// Stored report without its raw document.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReportSummary {
    pub id: i64,
    pub tester: String,
    pub client_version: String,
    pub test_type: String,
    pub commit_hash: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReportListResponse {
    pub success: bool,
    pub reports: Vec<ReportSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(value: serde_json::Value) -> SubmitReportRequest {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_meta_test_type() {
        let meta: SubmitMeta =
            serde_json::from_value(json!({"tester": "amy", "WAN": true, "LAN": true, "extra": 1}))
                .unwrap();
        assert_eq!(meta.test_type(), "WAN+LAN");
        assert_eq!(SubmitMeta::default().test_type(), "Unknown");
        assert_eq!(SubmitMeta::default().tester_name(), "Unknown");
    }

    #[test]
    fn test_validate_skips_empty_statuses() {
        let req = request(json!({
            "meta": {"tester": "amy", "commit": " "},
            "results": {
                "2004.1": {
                    "1": {"status": "Working"},
                    "2": {"status": ""},
                    "3": {"status": "n/a", "notes": "  skipped  "}
                }
            }
        }));

        let submissions = req.validate().unwrap();
        assert_eq!(submissions.len(), 1);
        assert_eq!(submissions[0].results.len(), 2);
        assert_eq!(submissions[0].results[1].status, TestStatus::NotApplicable);
        assert_eq!(submissions[0].results[1].notes.as_deref(), Some("skipped"));
        assert_eq!(req.meta.commit_hash(), None);
    }

    #[test]
    fn test_validate_rejects_unknown_status() {
        let req = request(json!({
            "results": {
                "2004.1": {"1": {"status": "Working"}},
                "2004.2": {"5": {"status": "Exploded"}}
            }
        }));

        let err = req.validate().unwrap_err();
        assert!(err.contains("Exploded"));
    }

    #[test]
    fn test_attached_logs_keyed_by_version() {
        let req = request(json!({
            "meta": {"tester": "amy", "WAN": true},
            "results": {"2004.1": {"1": {"status": "Working"}}},
            "attached_logs": {
                "2004.1": [{"filename": "client.log", "size": 2048, "data": "aGVsbG8="}]
            }
        }));

        let logs = req.attached_logs.as_ref().unwrap();
        assert_eq!(logs["2004.1"].len(), 1);
        assert_eq!(logs["2004.1"][0]["filename"], "client.log");
        assert_eq!(req.validate().unwrap().len(), 1);
    }

    #[test]
    fn test_full_session_file_accepted() {
        let req = request(json!({
            "meta": {"tester": "amy", "commit": "abc123", "LAN": true},
            "results": {"2004.1": {"1": {"status": "Working"}}},
            "timing": {"2004.1": 300},
            "completed": {"2004.1": true},
            "upload_hashes": {"2004.1": "9f86d081884c7d65"},
            "version_packages": {},
            "last_version": "2004.1"
        }));

        assert_eq!(
            req.upload_hashes.as_ref().unwrap()["2004.1"],
            "9f86d081884c7d65"
        );
        assert!(req.version_packages.as_ref().unwrap().is_empty());
        assert_eq!(req.validate().unwrap()[0].results.len(), 1);
    }

    #[test]
    fn test_result_entry_still_strict() {
        let result: Result<SubmitReportRequest, _> = serde_json::from_value(json!({
            "results": {"2004.1": {"1": {"status": "Working", "stauts": "x"}}}
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_keys_equal_after_trim_rejected() {
        let req = request(json!({
            "results": {
                "2004.1": {
                    "1": {"status": "Working"},
                    " 1": {"status": "Semi-working"}
                }
            }
        }));

        let err = req.validate().unwrap_err();
        assert!(err.contains("Duplicate test key '1'"));

        let unanswered = request(json!({
            "results": {"2004.1": {"1": {"status": "Working"}, " 1": {"status": ""}}}
        }));
        assert_eq!(unanswered.validate().unwrap()[0].results.len(), 1);
    }

    #[test]
    fn test_reports_query_filter() {
        let query: ReportsQuery = serde_json::from_value(json!({
            "tester": " amy ",
            "version": "",
            "type": "WAN",
            "limit": 0
        }))
        .unwrap();

        let filter = query.filter();
        assert_eq!(filter.tester.as_deref(), Some("amy"));
        assert_eq!(filter.client_version, None);
        assert_eq!(filter.test_type.as_deref(), Some("WAN"));
        assert_eq!(filter.limit, 1);

        assert_eq!(ReportsQuery::default().filter().limit, DEFAULT_REPORT_LIMIT);
        let huge = ReportsQuery {
            limit: Some(10_000),
            ..Default::default()
        };
        assert_eq!(huge.filter().limit, MAX_REPORT_LIMIT);
    }

    #[test]
    fn test_empty_results_rejected() {
        let req = request(json!({"results": {}}));
        assert!(req.validate().is_err());
    }
}
