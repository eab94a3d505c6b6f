//! Database queries for client versions.

use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

use crate::entity::client_version::{self, Entity as ClientVersion};
use crate::error::{AppError, AppResult};
use crate::models::UpsertVersionRequest;

use super::DbPool;

impl DbPool {
    /// List client versions ordered for display.
    pub async fn list_client_versions(
        &self,
        include_disabled: bool,
    ) -> AppResult<Vec<client_version::Model>> {
        let mut select = ClientVersion::find();
        if !include_disabled {
            select = select.filter(client_version::Column::IsEnabled.eq(true));
        }

        select
            .order_by_asc(client_version::Column::SortOrder)
            .order_by_asc(client_version::Column::VersionId)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list client versions: {}", e)))
    }

    /// Look up versions by their natural keys.
    pub async fn find_client_versions(
        &self,
        version_ids: &[String],
    ) -> AppResult<Vec<client_version::Model>> {
        if version_ids.is_empty() {
            return Ok(Vec::new());
        }

        ClientVersion::find()
            .filter(client_version::Column::VersionId.is_in(version_ids.iter().cloned()))
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to look up client versions: {}", e)))
    }

    /// Insert or update a client version by `version_id`.
    pub async fn upsert_client_version(
        &self,
        request: &UpsertVersionRequest,
    ) -> AppResult<client_version::Model> {
        let version_id = request.version_id.trim();
        if version_id.is_empty() || version_id.len() > 100 {
            return Err(AppError::InvalidInput(
                "version_id must be 1-100 characters".to_string(),
            ));
        }

        let skip_tests = serde_json::Value::from(
            request
                .skip_tests
                .iter()
                .map(|k| k.trim())
                .filter(|k| !k.is_empty())
                .collect::<Vec<_>>(),
        );

        let existing = ClientVersion::find()
            .filter(client_version::Column::VersionId.eq(version_id))
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to look up client version: {}", e)))?;

        let result = match existing {
            Some(found) => {
                let mut model: client_version::ActiveModel = found.into();
                model.display_name = Set(request.display_name.clone());
                model.sort_order = Set(request.sort_order);
                model.is_enabled = Set(request.is_enabled);
                model.skip_tests = Set(Some(skip_tests));
                model.update(self.connection()).await
            }
            None => {
                client_version::ActiveModel {
                    version_id: Set(version_id.to_string()),
                    display_name: Set(request.display_name.clone()),
                    sort_order: Set(request.sort_order),
                    is_enabled: Set(request.is_enabled),
                    skip_tests: Set(Some(skip_tests)),
                    ..Default::default()
                }
                .insert(self.connection())
                .await
            }
        };

        result.map_err(|e| AppError::Database(format!("Failed to save client version: {}", e)))
    }
}
