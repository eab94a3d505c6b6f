//! SQL backup export, import and upgrade dumps.
//!
//! The export produces a self-contained MySQL script; the import replays any
//! such script statement by statement.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use sea_orm::{
    ConnectionTrait, DbBackend, FromQueryResult, Statement, TransactionTrait,
};
use tracing::{info, warn};

use crate::error::{AppError, AppResult};
use crate::models::{ImportReport, StatementFailure};
use crate::services::sql_script::{
    ImportMode, ImportPlan, TableDump, dump_footer, dump_header, preview_statement,
    quote_identifier, render_table_dump,
};

use super::DbPool;
use super::version::SERVER_VERSION;

/// Exported tables, parents before children.
pub const EXPORT_TABLES: [&str; 7] = [
    "test_categories",
    "test_types",
    "client_versions",
    "test_templates",
    "template_versions",
    "reports",
    "test_results",
];

/// Number of upgrade dumps kept in the backup directory.
pub const BACKUPS_TO_KEEP: usize = 5;

/// Download name for an export taken at `at`.
pub fn backup_filename(at: DateTime<Utc>) -> String {
    format!("test_panel_backup_{}.sql", at.format("%Y%m%d_%H%M%S"))
}

impl DbPool {
    /// Dump schema and data of every exported table as a SQL script.
    pub async fn export_sql(&self) -> AppResult<String> {
        let mut out = dump_header(Utc::now(), SERVER_VERSION);

        for table in EXPORT_TABLES {
            let create_sql = self.show_create_table(table).await?;
            let columns = self.table_columns(table).await?;
            let rows = self.table_rows(table, &columns).await?;

            render_table_dump(
                &mut out,
                &TableDump {
                    table,
                    create_sql: &create_sql,
                    columns: &columns,
                    rows: &rows,
                },
            );
        }

        out.push_str(dump_footer());
        Ok(out)
    }

    async fn show_create_table(&self, table: &str) -> AppResult<String> {
        let stmt = Statement::from_string(
            DbBackend::MySql,
            format!("SHOW CREATE TABLE {}", quote_identifier(table)),
        );

        let row = self
            .connection()
            .query_one_raw(stmt)
            .await
            .map_err(|e| AppError::Database(format!("Failed to read schema of {}: {}", table, e)))?
            .ok_or_else(|| AppError::Database(format!("No schema returned for {}", table)))?;

        row.try_get::<String>("", "Create Table")
            .map_err(|e| AppError::Database(format!("Failed to read schema of {}: {}", table, e)))
    }

    async fn table_columns(&self, table: &str) -> AppResult<Vec<String>> {
        #[derive(Debug, FromQueryResult)]
        struct ColumnName {
            column_name: String,
        }

        let stmt = Statement::from_sql_and_values(
            DbBackend::MySql,
            "SELECT COLUMN_NAME AS column_name FROM information_schema.COLUMNS \
             WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ? \
             ORDER BY ORDINAL_POSITION",
            [sea_orm::Value::from(table)],
        );

        let columns = ColumnName::find_by_statement(stmt)
            .all(self.connection())
            .await
            .map_err(|e| {
                AppError::Database(format!("Failed to read columns of {}: {}", table, e))
            })?;

        Ok(columns.into_iter().map(|c| c.column_name).collect())
    }

    /// Every row of a table with each value cast to text.
    async fn table_rows(
        &self,
        table: &str,
        columns: &[String],
    ) -> AppResult<Vec<Vec<Option<String>>>> {
        if columns.is_empty() {
            return Ok(Vec::new());
        }

        let select_list = columns
            .iter()
            .map(|c| format!("CAST({} AS CHAR)", quote_identifier(c)))
            .collect::<Vec<_>>()
            .join(", ");
        let stmt = Statement::from_string(
            DbBackend::MySql,
            format!("SELECT {} FROM {}", select_list, quote_identifier(table)),
        );

        let rows = self
            .connection()
            .query_all_raw(stmt)
            .await
            .map_err(|e| AppError::Database(format!("Failed to read rows of {}: {}", table, e)))?;

        rows.iter()
            .map(|row| {
                (0..columns.len())
                    .map(|i| row.try_get_by_index::<Option<String>>(i))
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|e| {
                        AppError::Database(format!("Failed to decode row of {}: {}", table, e))
                    })
            })
            .collect()
    }

    /// Replay a SQL script, collecting per-statement failures.
    ///
    /// Statements run in order on one pinned connection so session settings
    /// such as `FOREIGN_KEY_CHECKS` apply to the statements after them. A
    /// failing statement is recorded and the pass continues; whatever
    /// succeeded is committed. DDL commits implicitly in MySQL, so the
    /// import is not atomic.
    pub async fn import_sql(&self, script: &str, mode: ImportMode) -> AppResult<ImportReport> {
        let plan = ImportPlan::build(script, mode);
        let mut report = ImportReport {
            skipped: plan.skipped,
            ..Default::default()
        };

        let session = self
            .connection()
            .begin()
            .await
            .map_err(|e| AppError::Database(format!("Failed to open import session: {}", e)))?;

        for statement in &plan.statements {
            match session.execute_unprepared(statement).await {
                Ok(_) => report.executed += 1,
                Err(e) => {
                    warn!("Import statement failed: {}", e);
                    report.failures.push(StatementFailure {
                        statement: preview_statement(statement),
                        error: e.to_string(),
                    });
                }
            }
        }

        // The connection goes back to the pool afterwards
        if let Err(e) = session
            .execute_unprepared("SET FOREIGN_KEY_CHECKS = 1")
            .await
        {
            warn!("Failed to restore foreign key checks: {}", e);
        }

        session
            .commit()
            .await
            .map_err(|e| AppError::Database(format!("Failed to commit import: {}", e)))?;

        info!(
            "Import ({}) finished: {} executed, {} skipped, {} failed",
            mode,
            report.executed,
            report.skipped,
            report.failures.len()
        );

        Ok(report)
    }
}

/// Write a SQL dump of the database before an upgrade.
///
/// Backup filename format: `v{version}_test_panel_backup_{YYYYMMDD_HHMMSS}.sql`
pub async fn create_backup(pool: &DbPool, backup_dir: &Path, version: &str) -> AppResult<PathBuf> {
    tokio::fs::create_dir_all(backup_dir)
        .await
        .map_err(|e| AppError::FileSystem(format!("Failed to create backup directory: {}", e)))?;

    let dump = pool.export_sql().await?;
    let backup_path = backup_dir.join(format!("v{}_{}", version, backup_filename(Utc::now())));

    tokio::fs::write(&backup_path, dump)
        .await
        .map_err(|e| AppError::FileSystem(format!("Failed to write backup file: {}", e)))?;

    info!("Created backup: {}", backup_path.display());

    Ok(backup_path)
}

/// Removes old backup files, keeping only the most recent N backups.
pub async fn cleanup_old_backups(backup_dir: &Path, keep_count: usize) -> AppResult<()> {
    let mut entries: Vec<_> = Vec::new();

    let mut dir = match tokio::fs::read_dir(backup_dir).await {
        Ok(dir) => dir,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Ok(());
        }
        Err(e) => {
            return Err(AppError::FileSystem(format!(
                "Failed to read backup directory: {}",
                e
            )));
        }
    };

    while let Some(entry) = dir
        .next_entry()
        .await
        .map_err(|e| AppError::FileSystem(format!("Failed to read backup entry: {}", e)))?
    {
        let path = entry.path();
        let is_backup = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(".sql") && n.contains("test_panel_backup_"));

        if is_backup
            && let Ok(metadata) = entry.metadata().await
            && let Ok(modified) = metadata.modified()
        {
            entries.push((path, modified));
        }
    }

    // Newest first; the name carries the timestamp when mtimes tie
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| b.0.cmp(&a.0)));

    for (path, _) in entries.into_iter().skip(keep_count) {
        if let Err(e) = tokio::fs::remove_file(&path).await {
            warn!("Failed to remove old backup {}: {}", path.display(), e);
        } else {
            info!("Removed old backup: {}", path.display());
        }
    }

    Ok(())
}
