//! Database queries for submitted reports and their results.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};
use serde_json::Value as JsonValue;
use tracing::info;

use crate::entity::report::{self, Entity as Report};
use crate::entity::test_result::{self, Entity as TestResult};
use crate::error::{AppError, AppResult};
use crate::models::CreatedReport;
use crate::models::report::{ReportFilter, SubmitMeta, VersionSubmission};

use super::DbPool;

impl DbPool {
    /// Store one report per client version with its results.
    ///
    /// All reports of a submission are written in a single transaction.
    pub async fn insert_submission(
        &self,
        meta: &SubmitMeta,
        submissions: &[VersionSubmission],
        raw_json: Option<JsonValue>,
    ) -> AppResult<Vec<CreatedReport>> {
        let txn = self
            .connection()
            .begin()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        let now = Utc::now();
        let tester = meta.tester_name();
        let mut created = Vec::with_capacity(submissions.len());

        for submission in submissions {
            let report = report::ActiveModel {
                tester: Set(tester.clone()),
                client_version: Set(submission.client_version.clone()),
                test_type: Set(meta.test_type().to_string()),
                commit_hash: Set(meta.commit_hash()),
                raw_json: Set(raw_json.clone()),
                submitted_at: Set(now),
                ..Default::default()
            }
            .insert(&txn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to insert report: {}", e)))?;

            if !submission.results.is_empty() {
                let rows = submission.results.iter().map(|r| test_result::ActiveModel {
                    report_id: Set(report.id),
                    test_key: Set(r.test_key.clone()),
                    status: Set(r.status.as_str().to_string()),
                    notes: Set(r.notes.clone()),
                    ..Default::default()
                });
                TestResult::insert_many(rows)
                    .exec_without_returning(&txn)
                    .await
                    .map_err(|e| AppError::Database(format!("Failed to insert results: {}", e)))?;
            }

            created.push(CreatedReport {
                report_id: report.id,
                client_version: submission.client_version.clone(),
                tests_recorded: submission.results.len(),
            });
        }

        txn.commit()
            .await
            .map_err(|e| AppError::Database(format!("Failed to commit transaction: {}", e)))?;

        info!(
            "Stored {} reports from {} ({})",
            created.len(),
            tester,
            meta.test_type()
        );

        Ok(created)
    }

    /// Reports matching the filter, newest first.
    pub async fn list_reports(&self, filter: &ReportFilter) -> AppResult<Vec<report::Model>> {
        let mut select = Report::find();
        if let Some(tester) = &filter.tester {
            select = select.filter(report::Column::Tester.eq(tester.as_str()));
        }
        if let Some(version) = &filter.client_version {
            select = select.filter(report::Column::ClientVersion.eq(version.as_str()));
        }
        if let Some(test_type) = &filter.test_type {
            select = select.filter(report::Column::TestType.eq(test_type.as_str()));
        }

        select
            .order_by_desc(report::Column::SubmittedAt)
            .order_by_desc(report::Column::Id)
            .limit(filter.limit)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list reports: {}", e)))
    }
}
