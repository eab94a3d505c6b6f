//! API Key model for authentication.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Roles attached to API keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ApiKeyRole {
    /// Curates the catalog, templates and backups.
    Admin,
    /// Submits reports.
    #[default]
    Tester,
    /// Reads the catalog only.
    Viewer,
}

impl ApiKeyRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Tester => "tester",
            Self::Viewer => "viewer",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "admin" => Some(Self::Admin),
            "tester" => Some(Self::Tester),
            "viewer" => Some(Self::Viewer),
            _ => None,
        }
    }
}

impl std::fmt::Display for ApiKeyRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// API Key stored in database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiKey {
    pub id: i64,
    /// SHA-256 hash of the full key
    pub key_hash: String,
    /// First 8 characters of the key for identification
    pub key_prefix: String,
    /// Human-readable name (e.g., "Lab PC 3")
    pub name: String,
    pub role: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    /// Soft delete timestamp (revoked)
    pub deleted_at: Option<DateTime<Utc>>,
}

impl ApiKey {
    /// Check if the key is revoked.
    pub fn is_revoked(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Check if the key is expired.
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|expires_at| Utc::now() > expires_at)
    }

    /// Get the role as enum.
    pub fn role_enum(&self) -> ApiKeyRole {
        ApiKeyRole::parse(&self.role).unwrap_or_default()
    }
}

impl From<crate::entity::api_key::Model> for ApiKey {
    fn from(model: crate::entity::api_key::Model) -> Self {
        Self {
            id: model.id,
            key_hash: model.key_hash,
            key_prefix: model.key_prefix,
            name: model.name,
            role: model.role,
            expires_at: model.expires_at,
            created_at: model.created_at,
            deleted_at: model.deleted_at,
        }
    }
}

/// Response when creating a new API key (includes the full key).
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiKeyCreateResponse {
    pub id: i64,
    /// Full key - only shown once
    pub key: String,
    pub name: String,
    pub role: String,
    pub expires_at: Option<String>,
    pub created_at: String,
}

/// Response for listing API keys (key masked).
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiKeyListItem {
    pub id: i64,
    pub key_prefix: String,
    pub name: String,
    pub role: String,
    pub expires_at: Option<String>,
    pub created_at: String,
    pub is_revoked: bool,
}

impl From<ApiKey> for ApiKeyListItem {
    fn from(key: ApiKey) -> Self {
        Self {
            id: key.id,
            key_prefix: key.key_prefix,
            name: key.name,
            role: key.role,
            expires_at: key.expires_at.map(|d| d.to_rfc3339()),
            created_at: key.created_at.to_rfc3339(),
            is_revoked: key.deleted_at.is_some(),
        }
    }
}

/// Request to create a new API key.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateApiKeyRequest {
    pub name: String,
    #[serde(default)]
    pub role: Option<String>,
    /// Expiration duration (e.g., "365d", "30d", "1y")
    #[serde(default)]
    pub expires_in: Option<String>,
}

/// Authenticated caller information extracted from API key.
#[derive(Debug, Clone)]
pub struct AuthenticatedCaller {
    /// Database id of the key, `None` for the bootstrap admin key.
    pub key_id: Option<i64>,
    pub name: String,
    pub key_prefix: String,
    pub role: ApiKeyRole,
}

impl AuthenticatedCaller {
    /// Check if the caller has admin role.
    pub fn is_admin(&self) -> bool {
        matches!(self.role, ApiKeyRole::Admin)
    }

    /// Check if the caller may submit reports.
    pub fn can_submit(&self) -> bool {
        matches!(self.role, ApiKeyRole::Admin | ApiKeyRole::Tester)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn key(role: &str, expires_at: Option<DateTime<Utc>>) -> ApiKey {
        ApiKey {
            id: 1,
            key_hash: "0".repeat(64),
            key_prefix: "tp_abcde".to_string(),
            name: "Lab PC".to_string(),
            role: role.to_string(),
            expires_at,
            created_at: Utc::now(),
            deleted_at: None,
        }
    }

    #[test]
    fn test_role_round_trip_and_default() {
        assert_eq!(ApiKeyRole::parse("ADMIN"), Some(ApiKeyRole::Admin));
        assert_eq!(ApiKeyRole::parse("tester"), Some(ApiKeyRole::Tester));
        assert_eq!(ApiKeyRole::parse("contributor"), None);
        assert_eq!(key("bogus", None).role_enum(), ApiKeyRole::Tester);
    }

    #[test]
    fn test_expiry() {
        assert!(!key("admin", None).is_expired());
        assert!(key("admin", Some(Utc::now() - Duration::days(1))).is_expired());
        assert!(!key("admin", Some(Utc::now() + Duration::days(1))).is_expired());
    }
}
