//! Create test_templates table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TestTemplate::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TestTemplate::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TestTemplate::Name).string_len(255).not_null())
                    .col(ColumnDef::new(TestTemplate::Description).text())
                    .col(ColumnDef::new(TestTemplate::TestKeys).json().not_null())
                    .col(
                        ColumnDef::new(TestTemplate::IsDefault)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(TestTemplate::IsSystem)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(TestTemplate::CreatedBy).string_len(100))
                    .col(
                        ColumnDef::new(TestTemplate::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(TestTemplate::UpdatedAt)
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
                    .name("idx_test_templates_default")
                    .table(TestTemplate::Table)
                    .col(TestTemplate::IsDefault)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TestTemplate::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum TestTemplate {
    #[sea_orm(iden = "test_templates")]
    Table,
    Id,
    Name,
    Description,
    TestKeys,
    IsDefault,
    IsSystem,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}
