//! Database operations for API keys using SeaORM.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

use crate::entity::api_key::{self, Entity as ApiKeyEntity};
use crate::error::{AppError, AppResult};
use crate::models::{ApiKey, ApiKeyRole};

use super::DbPool;

/// Values for a key about to be stored.
pub struct NewApiKey {
    pub key_hash: String,
    pub key_prefix: String,
    pub name: String,
    pub role: ApiKeyRole,
    pub expires_at: Option<DateTime<Utc>>,
}

impl DbPool {
    /// Insert a new API key.
    pub async fn insert_api_key(&self, key: NewApiKey) -> AppResult<ApiKey> {
        let model = api_key::ActiveModel {
            key_hash: Set(key.key_hash),
            key_prefix: Set(key.key_prefix),
            name: Set(key.name),
            role: Set(key.role.as_str().to_string()),
            expires_at: Set(key.expires_at),
            created_at: Set(Utc::now()),
            deleted_at: Set(None),
            ..Default::default()
        };

        let inserted = model
            .insert(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to insert API key: {}", e)))?;

        Ok(inserted.into())
    }

    /// Find an API key by its hash.
    pub async fn find_api_key_by_hash(&self, key_hash: &str) -> AppResult<Option<ApiKey>> {
        let result = ApiKeyEntity::find()
            .filter(api_key::Column::KeyHash.eq(key_hash))
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to look up API key: {}", e)))?;

        Ok(result.map(ApiKey::from))
    }

    pub async fn get_api_key(&self, id: i64) -> AppResult<Option<ApiKey>> {
        let result = ApiKeyEntity::find_by_id(id)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to look up API key: {}", e)))?;

        Ok(result.map(ApiKey::from))
    }

    /// List all API keys (including revoked).
    pub async fn list_api_keys(&self) -> AppResult<Vec<ApiKey>> {
        let results = ApiKeyEntity::find()
            .order_by_desc(api_key::Column::CreatedAt)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list API keys: {}", e)))?;

        Ok(results.into_iter().map(ApiKey::from).collect())
    }

    /// Revoke an API key (soft delete).
    ///
    /// Returns `false` if the key does not exist or is already revoked.
    pub async fn revoke_api_key(&self, id: i64) -> AppResult<bool> {
        let model = ApiKeyEntity::find_by_id(id)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to look up API key: {}", e)))?;

        let Some(model) = model else {
            return Ok(false);
        };
        if model.deleted_at.is_some() {
            return Ok(false);
        }

        let mut active: api_key::ActiveModel = model.into();
        active.deleted_at = Set(Some(Utc::now()));
        active
            .update(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to revoke API key: {}", e)))?;

        Ok(true)
    }
}
