//! Result status recorded for a single test.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Outcome of a test on a client version.
///
/// `SemiWorking` and `PartiallyWorking` are kept apart: older reports use the
/// latter, the submission tool sends the former, and their meaning has never
/// been reconciled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum TestStatus {
    #[serde(rename = "Working")]
    Working,
    #[serde(rename = "Semi-working")]
    SemiWorking,
    #[serde(rename = "Not working")]
    NotWorking,
    #[serde(rename = "Partially Working")]
    PartiallyWorking,
    #[serde(rename = "N/A")]
    NotApplicable,
}

impl TestStatus {
    pub const ALL: [TestStatus; 5] = [
        Self::Working,
        Self::SemiWorking,
        Self::NotWorking,
        Self::PartiallyWorking,
        Self::NotApplicable,
    ];

    /// Convert to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Working => "Working",
            Self::SemiWorking => "Semi-working",
            Self::NotWorking => "Not working",
            Self::PartiallyWorking => "Partially Working",
            Self::NotApplicable => "N/A",
        }
    }

    /// Parse a stored or submitted status, ignoring case and surrounding spaces.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s))
            .or_else(|| s.eq_ignore_ascii_case("na").then_some(Self::NotApplicable))
    }
}

impl std::fmt::Display for TestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_statuses() {
        for status in TestStatus::ALL {
            assert_eq!(TestStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(TestStatus::parse(" not WORKING "), Some(TestStatus::NotWorking));
        assert_eq!(TestStatus::parse("n/a"), Some(TestStatus::NotApplicable));
        assert_eq!(TestStatus::parse("NA"), Some(TestStatus::NotApplicable));
    }

    #[test]
    fn test_semi_and_partial_stay_distinct() {
        assert_ne!(
            TestStatus::parse("Semi-working"),
            TestStatus::parse("Partially Working")
        );
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert_eq!(TestStatus::parse("Broken"), None);
        assert_eq!(TestStatus::parse(""), None);
    }

    #[test]
    fn test_serde_uses_display_names() {
        let json = serde_json::to_string(&TestStatus::NotApplicable).unwrap();
        assert_eq!(json, "\"N/A\"");
        let parsed: TestStatus = serde_json::from_str("\"Semi-working\"").unwrap();
        assert_eq!(parsed, TestStatus::SemiWorking);
    }
}
