//! API Key service for generation, verification, and management.

use chrono::{Duration, Utc};
use rand::Rng;
use sha2::{Digest, Sha256};
use tracing::info;

use crate::db::DbPool;
use crate::db::api_keys::NewApiKey;
use crate::error::{AppError, AppResult};
use crate::models::{ApiKey, ApiKeyRole, AuthenticatedCaller};

/// API key prefix.
const KEY_PREFIX: &str = "tp_";
/// Length of random part of the key.
const KEY_RANDOM_LENGTH: usize = 32;
/// Length of the key prefix stored for identification.
const KEY_PREFIX_LENGTH: usize = 8;

/// Generate a new random API key.
///
/// Returns the full key (to be shown to user once) and the values to store.
pub fn generate_key(
    name: &str,
    role: ApiKeyRole,
    expires_in: Option<&str>,
) -> AppResult<(String, NewApiKey)> {
    let expires_at = match expires_in.map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => {
            let duration = parse_duration(raw).ok_or_else(|| {
                AppError::InvalidInput(format!(
                    "Invalid expiry '{}'; use e.g. 30d, 2w, 6m or 1y",
                    raw
                ))
            })?;
            Some(Utc::now() + duration)
        }
        None => None,
    };

    let random_part: String = rand::rng()
        .sample_iter(&rand::distr::Alphanumeric)
        .take(KEY_RANDOM_LENGTH)
        .map(char::from)
        .collect();

    let full_key = format!("{}{}", KEY_PREFIX, random_part);

    let new_key = NewApiKey {
        key_hash: hash_key(&full_key),
        key_prefix: full_key.chars().take(KEY_PREFIX_LENGTH).collect(),
        name: name.trim().to_string(),
        role,
        expires_at,
    };

    Ok((full_key, new_key))
}

/// Hash an API key using SHA-256.
pub fn hash_key(key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    hex::encode(hasher.finalize())
}

/// Parse a duration string like "365d", "30d", "2w", "6m", "1y".
fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim().to_lowercase();

    let duration = if let Some(days) = s.strip_suffix('d') {
        days.parse::<i64>().ok().and_then(Duration::try_days)
    } else if let Some(years) = s.strip_suffix('y') {
        years
            .parse::<i64>()
            .ok()
            .and_then(|y| Duration::try_days(y * 365))
    } else if let Some(months) = s.strip_suffix('m') {
        months
            .parse::<i64>()
            .ok()
            .and_then(|m| Duration::try_days(m * 30))
    } else if let Some(weeks) = s.strip_suffix('w') {
        weeks.parse::<i64>().ok().and_then(Duration::try_weeks)
    } else {
        // Bare numbers are days
        s.parse::<i64>().ok().and_then(Duration::try_days)
    };

    duration.filter(|d| *d > Duration::zero())
}

/// Verify an API key and return the authenticated caller.
pub async fn verify_key(pool: &DbPool, key: &str) -> AppResult<AuthenticatedCaller> {
    let api_key = pool
        .find_api_key_by_hash(&hash_key(key))
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid API key".to_string()))?;

    if api_key.is_revoked() {
        return Err(AppError::Unauthorized(
            "API key has been revoked".to_string(),
        ));
    }

    if api_key.is_expired() {
        return Err(AppError::Unauthorized("API key has expired".to_string()));
    }

    let role = api_key.role_enum();

    Ok(AuthenticatedCaller {
        key_id: Some(api_key.id),
        name: api_key.name,
        key_prefix: api_key.key_prefix,
        role,
    })
}

/// Create a new API key and store it in the database.
pub async fn create_key(
    pool: &DbPool,
    name: &str,
    role: ApiKeyRole,
    expires_in: Option<&str>,
) -> AppResult<(String, ApiKey)> {
    if name.trim().is_empty() {
        return Err(AppError::InvalidInput("Name is required".to_string()));
    }

    let (full_key, new_key) = generate_key(name, role, expires_in)?;
    let stored = pool.insert_api_key(new_key).await?;

    info!(
        "Created API key {} ({}) with role {}",
        stored.key_prefix, stored.name, stored.role
    );

    Ok((full_key, stored))
}
