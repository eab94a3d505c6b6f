//! Create reports table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Report::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Report::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Report::Tester).string_len(100).not_null())
                    .col(
                        ColumnDef::new(Report::ClientVersion)
                            .string_len(100)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Report::TestType)
                            .string_len(20)
                            .not_null()
                            .default("Unknown"),
                    )
                    .col(ColumnDef::new(Report::CommitHash).string_len(100))
                    .col(ColumnDef::new(Report::RawJson).json())
                    .col(
                        ColumnDef::new(Report::SubmittedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_reports_client_version")
                    .table(Report::Table)
                    .col(Report::ClientVersion)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Report::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Report {
    #[sea_orm(iden = "reports")]
    Table,
    Id,
    Tester,
    ClientVersion,
    TestType,
    CommitHash,
    RawJson,
    SubmittedAt,
}
