//! Database queries for test templates and their version assignments.

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tracing::info;

use crate::entity::client_version::Entity as ClientVersion;
use crate::entity::template_version::{self, Entity as TemplateVersion};
use crate::entity::test_template::{self, Entity as TestTemplate};
use crate::error::{AppError, AppResult};
use crate::models::catalog::json_string_list;
use crate::models::template::DEFAULT_TEMPLATE_NAME;
use crate::models::{TemplateRequest, TemplateSummary};

use super::DbPool;

impl DbPool {
    pub async fn list_templates(&self) -> AppResult<Vec<test_template::Model>> {
        TestTemplate::find()
            .order_by_asc(test_template::Column::Id)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list templates: {}", e)))
    }

    pub async fn list_template_assignments(&self) -> AppResult<Vec<template_version::Model>> {
        TemplateVersion::find()
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list template assignments: {}", e)))
    }

    pub async fn get_template(&self, id: i64) -> AppResult<test_template::Model> {
        TestTemplate::find_by_id(id)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get template: {}", e)))?
            .ok_or_else(|| AppError::NotFound(format!("Template {}", id)))
    }

    /// Create the system default template if no template is marked default.
    ///
    /// The new template holds every enabled test key. Returns the created
    /// template, or `None` when a default already existed.
    pub async fn ensure_default_template(&self) -> AppResult<Option<test_template::Model>> {
        let existing = TestTemplate::find()
            .filter(test_template::Column::IsDefault.eq(true))
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to look up default template: {}", e)))?;
        if existing.is_some() {
            return Ok(None);
        }

        let keys = self.enabled_test_keys().await?;
        let now = Utc::now();
        let model = test_template::ActiveModel {
            name: Set(DEFAULT_TEMPLATE_NAME.to_string()),
            description: Set(Some("All enabled tests".to_string())),
            test_keys: Set(serde_json::Value::from(keys)),
            is_default: Set(true),
            is_system: Set(true),
            created_by: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let created = model
            .insert(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to create default template: {}", e)))?;

        info!(
            "Created default template {} with {} tests",
            created.id,
            json_string_list(Some(&created.test_keys)).len()
        );

        Ok(Some(created))
    }

    /// List templates with the version ids assigned to each.
    pub async fn list_template_summaries(&self) -> AppResult<Vec<TemplateSummary>> {
        let templates = self.list_templates().await?;
        let assignments = self.list_template_assignments().await?;
        let versions = ClientVersion::find()
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list client versions: {}", e)))?;

        Ok(templates
            .into_iter()
            .map(|template| {
                let mut version_ids: Vec<String> = assignments
                    .iter()
                    .filter(|a| a.template_id == template.id)
                    .filter_map(|a| versions.iter().find(|v| v.id == a.client_version_id))
                    .map(|v| v.version_id.clone())
                    .collect();
                version_ids.sort();
                TemplateSummary::from_model(template, version_ids)
            })
            .collect())
    }

    async fn validated_keys(&self, request: &TemplateRequest) -> AppResult<Vec<String>> {
        if request.name.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Template name must not be empty".to_string(),
            ));
        }

        let keys = request.normalized_keys();
        let unknown = self.unknown_test_keys(&keys).await?;
        if !unknown.is_empty() {
            return Err(AppError::InvalidInput(format!(
                "Unknown test keys: {}",
                unknown.join(", ")
            )));
        }

        Ok(keys)
    }

    pub async fn create_template(
        &self,
        request: &TemplateRequest,
        created_by: &str,
    ) -> AppResult<test_template::Model> {
        let keys = self.validated_keys(request).await?;
        let now = Utc::now();

        let model = test_template::ActiveModel {
            name: Set(request.name.trim().to_string()),
            description: Set(request.description.clone()),
            test_keys: Set(serde_json::Value::from(keys)),
            is_default: Set(false),
            is_system: Set(false),
            created_by: Set(Some(created_by.to_string())),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        model
            .insert(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to insert template: {}", e)))
    }

    pub async fn update_template(
        &self,
        id: i64,
        request: &TemplateRequest,
    ) -> AppResult<test_template::Model> {
        let existing = self.get_template(id).await?;
        let keys = self.validated_keys(request).await?;

        let mut model: test_template::ActiveModel = existing.into();
        model.name = Set(request.name.trim().to_string());
        model.description = Set(request.description.clone());
        model.test_keys = Set(serde_json::Value::from(keys));
        model.updated_at = Set(Utc::now());

        model
            .update(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to update template: {}", e)))
    }

    /// Make a template the single default.
    pub async fn set_default_template(&self, id: i64) -> AppResult<()> {
        let txn = self
            .connection()
            .begin()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        let exists = TestTemplate::find_by_id(id)
            .one(&txn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to get template: {}", e)))?;
        if exists.is_none() {
            return Err(AppError::NotFound(format!("Template {}", id)));
        }

        TestTemplate::update_many()
            .col_expr(test_template::Column::IsDefault, Expr::value(false))
            .filter(test_template::Column::IsDefault.eq(true))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to clear default template: {}", e)))?;

        TestTemplate::update_many()
            .col_expr(test_template::Column::IsDefault, Expr::value(true))
            .col_expr(test_template::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(test_template::Column::Id.eq(id))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to set default template: {}", e)))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(format!("Failed to commit transaction: {}", e)))?;

        info!("Template {} is now the default", id);
        Ok(())
    }

    /// Replace the versions assigned to a template.
    ///
    /// Versions currently assigned to other templates move to this one.
    /// Returns the assigned version ids.
    pub async fn assign_template_versions(
        &self,
        id: i64,
        version_ids: &[String],
    ) -> AppResult<Vec<String>> {
        self.get_template(id).await?;

        let mut requested: Vec<String> = version_ids
            .iter()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .collect();
        requested.sort();
        requested.dedup();

        let versions = self.find_client_versions(&requested).await?;
        let missing: Vec<&str> = requested
            .iter()
            .filter(|r| !versions.iter().any(|v| &v.version_id == *r))
            .map(String::as_str)
            .collect();
        if !missing.is_empty() {
            return Err(AppError::InvalidInput(format!(
                "Unknown client versions: {}",
                missing.join(", ")
            )));
        }
        let version_pks: Vec<i64> = versions.iter().map(|v| v.id).collect();

        let txn = self
            .connection()
            .begin()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        TemplateVersion::delete_many()
            .filter(template_version::Column::TemplateId.eq(id))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to clear assignments: {}", e)))?;

        if !version_pks.is_empty() {
            TemplateVersion::delete_many()
                .filter(template_version::Column::ClientVersionId.is_in(version_pks.clone()))
                .exec(&txn)
                .await
                .map_err(|e| AppError::Database(format!("Failed to move assignments: {}", e)))?;

            let rows = version_pks.iter().map(|pk| template_version::ActiveModel {
                template_id: Set(id),
                client_version_id: Set(*pk),
            });
            TemplateVersion::insert_many(rows)
                .exec_without_returning(&txn)
                .await
                .map_err(|e| AppError::Database(format!("Failed to insert assignments: {}", e)))?;
        }

        txn.commit()
            .await
            .map_err(|e| AppError::Database(format!("Failed to commit transaction: {}", e)))?;

        info!("Template {} assigned to {} versions", id, requested.len());
        Ok(requested)
    }

    /// Delete a template that is neither a system template nor the default.
    pub async fn delete_template(&self, id: i64) -> AppResult<()> {
        let template = self.get_template(id).await?;
        if template.is_system {
            return Err(AppError::InvalidInput(
                "System templates cannot be deleted".to_string(),
            ));
        }
        if template.is_default {
            return Err(AppError::InvalidInput(
                "The default template cannot be deleted; make another template default first"
                    .to_string(),
            ));
        }

        TestTemplate::delete_by_id(id)
            .exec(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to delete template: {}", e)))?;

        info!("Deleted template {}", id);
        Ok(())
    }
}

