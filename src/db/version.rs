//! Server version tracking and comparison.
//!
//! Tracks server version in the database and determines when backups are needed.

use std::fmt;

use chrono::Utc;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use tracing::info;

use crate::entity::server_metadata::{self, Entity as ServerMetadata};
use crate::error::{AppError, AppResult};

use super::{DbPool, is_missing_table};

/// Server version from Cargo.toml.
pub const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Metadata keys stored in server_metadata table.
const KEY_SERVER_VERSION: &str = "server_version";

/// Parsed semantic version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl Version {
    /// Parse a version string (e.g., "0.1.0").
    pub fn parse(version: &str) -> AppResult<Self> {
        let parts: Vec<&str> = version.trim().split('.').collect();
        if parts.len() != 3 {
            return Err(AppError::InvalidInput(format!(
                "Invalid version format: {}",
                version
            )));
        }

        let major = parts[0]
            .parse()
            .map_err(|_| AppError::InvalidInput(format!("Invalid major version: {}", parts[0])))?;
        let minor = parts[1]
            .parse()
            .map_err(|_| AppError::InvalidInput(format!("Invalid minor version: {}", parts[1])))?;
        let patch = parts[2]
            .parse()
            .map_err(|_| AppError::InvalidInput(format!("Invalid patch version: {}", parts[2])))?;

        Ok(Version {
            major,
            minor,
            patch,
        })
    }

    /// Check if this version has a minor bump compared to another.
    /// Returns true if major or minor version is different (not just patch).
    pub fn has_minor_bump(&self, other: &Version) -> bool {
        self.major != other.major || self.minor != other.minor
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Outcome of comparing the stored version with the running binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionCheck {
    /// A SQL dump should be written before continuing.
    pub needs_backup: bool,
    /// The stored version must be updated.
    pub changed: bool,
}

/// Decide what to do given the stored version (if any).
pub fn compare_versions(stored: Option<&str>, current: &str) -> AppResult<VersionCheck> {
    let current_version = Version::parse(current)?;

    let Some(stored) = stored else {
        info!("First run, no previous version stored");
        return Ok(VersionCheck {
            needs_backup: false,
            changed: true,
        });
    };

    if stored == current {
        info!("Server version unchanged: {}", current);
        return Ok(VersionCheck {
            needs_backup: false,
            changed: false,
        });
    }

    let stored_version = Version::parse(stored)?;
    let needs_backup = current_version.has_minor_bump(&stored_version);
    if needs_backup {
        info!(
            "Minor version bump detected: {} -> {} (backup required)",
            stored, current
        );
    } else {
        info!(
            "Patch version bump detected: {} -> {} (no backup needed)",
            stored, current
        );
    }

    Ok(VersionCheck {
        needs_backup,
        changed: true,
    })
}

impl DbPool {
    /// Get the stored server version from the database.
    pub async fn get_stored_version(&self) -> AppResult<Option<String>> {
        match ServerMetadata::find_by_id(KEY_SERVER_VERSION.to_string())
            .one(self.connection())
            .await
        {
            Ok(row) => Ok(row.map(|r| r.meta_value)),
            // Table might not exist yet
            Err(e) if is_missing_table(&e) => Ok(None),
            Err(e) => Err(AppError::Database(format!(
                "Failed to read server version: {}",
                e
            ))),
        }
    }

    /// Update the stored server version in the database.
    pub async fn update_stored_version(&self, version: &str) -> AppResult<()> {
        let existing = ServerMetadata::find_by_id(KEY_SERVER_VERSION.to_string())
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to read server version: {}", e)))?;

        let result = match existing {
            Some(row) => {
                let mut active: server_metadata::ActiveModel = row.into();
                active.meta_value = Set(version.to_string());
                active.updated_at = Set(Utc::now());
                active.update(self.connection()).await.map(|_| ())
            }
            None => server_metadata::ActiveModel {
                meta_key: Set(KEY_SERVER_VERSION.to_string()),
                meta_value: Set(version.to_string()),
                updated_at: Set(Utc::now()),
            }
            .insert(self.connection())
            .await
            .map(|_| ()),
        };

        result.map_err(|e| AppError::Database(format!("Failed to update server version: {}", e)))?;

        info!("Server version updated to {}", version);
        Ok(())
    }

    /// Check version and determine if backup is needed.
    pub async fn check_version(&self) -> AppResult<VersionCheck> {
        let stored = self.get_stored_version().await?;
        compare_versions(stored.as_deref(), SERVER_VERSION)
    }
}
