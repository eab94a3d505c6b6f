//! Database queries for the test catalog: categories and test definitions.

use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DbBackend, EntityTrait, FromQueryResult, QueryFilter,
    QueryOrder, Set, Statement, TransactionTrait,
};
use tracing::info;

use crate::entity::test_category::{self, Entity as TestCategory};
use crate::entity::test_type::{self, Entity as TestType};
use crate::error::{AppError, AppResult};
use crate::models::{CreateCategoryRequest, UpsertTestTypeRequest};
use crate::services::visibility::{Catalog, TestedCounts, TestedIndex};

use super::{DbPool, is_missing_table};

impl DbPool {
    /// Load every category and test definition.
    ///
    /// Returns `None` when the catalog tables do not exist.
    pub async fn load_catalog(&self) -> AppResult<Option<Catalog>> {
        let categories = match TestCategory::find()
            .order_by_asc(test_category::Column::SortOrder)
            .order_by_asc(test_category::Column::Id)
            .all(self.connection())
            .await
        {
            Ok(rows) => rows,
            Err(e) if is_missing_table(&e) => return Ok(None),
            Err(e) => {
                return Err(AppError::Database(format!(
                    "Failed to load test categories: {}",
                    e
                )));
            }
        };

        let tests = match TestType::find()
            .order_by_asc(test_type::Column::SortOrder)
            .order_by_asc(test_type::Column::TestKey)
            .all(self.connection())
            .await
        {
            Ok(rows) => rows,
            Err(e) if is_missing_table(&e) => return Ok(None),
            Err(e) => {
                return Err(AppError::Database(format!(
                    "Failed to load test types: {}",
                    e
                )));
            }
        };

        Ok(Some(Catalog { categories, tests }))
    }

    /// Count results and reports per test key for the given client versions.
    pub async fn tested_counts(&self, client_versions: &[String]) -> AppResult<TestedIndex> {
        if client_versions.is_empty() {
            return Ok(TestedIndex::new());
        }

        #[derive(Debug, FromQueryResult)]
        struct CountResult {
            test_key: String,
            result_count: i64,
            report_count: i64,
        }

        let placeholders = vec!["?"; client_versions.len()].join(", ");
        let sql = format!(
            "SELECT tr.test_key AS test_key, COUNT(*) AS result_count, \
             COUNT(DISTINCT tr.report_id) AS report_count \
             FROM test_results tr \
             INNER JOIN reports r ON r.id = tr.report_id \
             WHERE r.client_version IN ({}) \
             GROUP BY tr.test_key",
            placeholders
        );
        let values: Vec<sea_orm::Value> = client_versions
            .iter()
            .map(|v| sea_orm::Value::from(v.clone()))
            .collect();

        let rows = match CountResult::find_by_statement(Statement::from_sql_and_values(
            DbBackend::MySql,
            &sql,
            values,
        ))
        .all(self.connection())
        .await
        {
            Ok(rows) => rows,
            Err(e) if is_missing_table(&e) => return Ok(TestedIndex::new()),
            Err(e) => {
                return Err(AppError::Database(format!(
                    "Failed to count tested results: {}",
                    e
                )));
            }
        };

        Ok(rows
            .into_iter()
            .map(|row| {
                (
                    row.test_key,
                    TestedCounts {
                        result_count: row.result_count.max(0) as u64,
                        report_count: row.report_count.max(0) as u64,
                    },
                )
            })
            .collect())
    }

    /// Keys of every enabled test, in display order.
    pub async fn enabled_test_keys(&self) -> AppResult<Vec<String>> {
        let rows = TestType::find()
            .filter(test_type::Column::IsEnabled.eq(true))
            .order_by_asc(test_type::Column::SortOrder)
            .order_by_asc(test_type::Column::TestKey)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list enabled tests: {}", e)))?;

        Ok(rows.into_iter().map(|t| t.test_key).collect())
    }

    /// Return the keys from `keys` that have no test definition.
    pub async fn unknown_test_keys(&self, keys: &[String]) -> AppResult<Vec<String>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let known: Vec<String> = TestType::find()
            .filter(test_type::Column::TestKey.is_in(keys.iter().cloned()))
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to check test keys: {}", e)))?
            .into_iter()
            .map(|t| t.test_key)
            .collect();

        Ok(keys
            .iter()
            .filter(|k| !known.contains(k))
            .cloned()
            .collect())
    }

    pub async fn create_category(
        &self,
        request: &CreateCategoryRequest,
    ) -> AppResult<test_category::Model> {
        let name = request.name.trim();
        if name.is_empty() {
            return Err(AppError::InvalidInput(
                "Category name must not be empty".to_string(),
            ));
        }

        let existing = TestCategory::find()
            .filter(test_category::Column::Name.eq(name))
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to look up category: {}", e)))?;
        if existing.is_some() {
            return Err(AppError::InvalidInput(format!(
                "Category '{}' already exists",
                name
            )));
        }

        let model = test_category::ActiveModel {
            name: Set(name.to_string()),
            sort_order: Set(request.sort_order),
            ..Default::default()
        };

        model
            .insert(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to insert category: {}", e)))
    }

    /// Delete a category, disabling and detaching its tests.
    ///
    /// Returns `false` if the category does not exist.
    pub async fn delete_category(&self, id: i64) -> AppResult<bool> {
        let txn = self
            .connection()
            .begin()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        let disabled = TestType::update_many()
            .col_expr(test_type::Column::IsEnabled, Expr::value(false))
            .col_expr(test_type::Column::CategoryId, Expr::value(Option::<i64>::None))
            .filter(test_type::Column::CategoryId.eq(id))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to disable category tests: {}", e)))?;

        let deleted = TestCategory::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to delete category: {}", e)))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(format!("Failed to commit transaction: {}", e)))?;

        if deleted.rows_affected > 0 {
            info!(
                "Deleted category {} and disabled {} tests",
                id, disabled.rows_affected
            );
        }

        Ok(deleted.rows_affected > 0)
    }

    /// Insert or update a test definition by its key.
    pub async fn upsert_test_type(
        &self,
        request: &UpsertTestTypeRequest,
    ) -> AppResult<test_type::Model> {
        let test_key = request.test_key.trim();
        if test_key.is_empty() || test_key.len() > 20 {
            return Err(AppError::InvalidInput(
                "test_key must be 1-20 characters".to_string(),
            ));
        }
        if request.name.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Test name must not be empty".to_string(),
            ));
        }

        if let Some(category_id) = request.category_id {
            let category = TestCategory::find_by_id(category_id)
                .one(self.connection())
                .await
                .map_err(|e| AppError::Database(format!("Failed to look up category: {}", e)))?;
            if category.is_none() {
                return Err(AppError::InvalidInput(format!(
                    "Unknown category_id {}",
                    category_id
                )));
            }
        }

        let existing = TestType::find()
            .filter(test_type::Column::TestKey.eq(test_key))
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to look up test: {}", e)))?;

        let result = match existing {
            Some(found) => {
                let mut model: test_type::ActiveModel = found.into();
                apply_test_fields(&mut model, request);
                model.update(self.connection()).await
            }
            None => {
                let mut model = test_type::ActiveModel {
                    test_key: Set(test_key.to_string()),
                    ..Default::default()
                };
                apply_test_fields(&mut model, request);
                model.insert(self.connection()).await
            }
        };

        result.map_err(|e| AppError::Database(format!("Failed to save test: {}", e)))
    }
}

fn apply_test_fields(model: &mut test_type::ActiveModel, request: &UpsertTestTypeRequest) {
    model.name = Set(request.name.trim().to_string());
    model.description = Set(request.description.clone());
    model.category_id = Set(request.category_id);
    model.is_enabled = Set(request.is_enabled);
    model.sort_order = Set(request.sort_order);
}
