//! Create test_results table.

use sea_orm_migration::prelude::*;

use super::m20260301_000006_create_reports::Report;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TestResult::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TestResult::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TestResult::ReportId).big_integer().not_null())
                    .col(ColumnDef::new(TestResult::TestKey).string_len(20).not_null())
                    .col(ColumnDef::new(TestResult::Status).string_len(20).not_null())
                    .col(ColumnDef::new(TestResult::Notes).text())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_test_results_report")
                            .from(TestResult::Table, TestResult::ReportId)
                            .to(Report::Table, Report::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_test_results_report_test")
                    .table(TestResult::Table)
                    .col(TestResult::ReportId)
                    .col(TestResult::TestKey)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_test_results_test_key")
                    .table(TestResult::Table)
                    .col(TestResult::TestKey)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TestResult::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum TestResult {
    #[sea_orm(iden = "test_results")]
    Table,
    Id,
    ReportId,
    TestKey,
    Status,
    Notes,
}
