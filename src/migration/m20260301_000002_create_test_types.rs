//! Create test_types table.

use sea_orm_migration::prelude::*;

use super::m20260301_000001_create_test_categories::TestCategory;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TestType::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TestType::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(TestType::TestKey)
                            .string_len(20)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(TestType::Name).string_len(255).not_null())
                    .col(ColumnDef::new(TestType::Description).text())
                    .col(ColumnDef::new(TestType::CategoryId).big_integer())
                    .col(
                        ColumnDef::new(TestType::IsEnabled)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(TestType::SortOrder)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_test_types_category")
                            .from(TestType::Table, TestType::CategoryId)
                            .to(TestCategory::Table, TestCategory::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_test_types_category_sort")
                    .table(TestType::Table)
                    .col(TestType::CategoryId)
                    .col(TestType::SortOrder)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TestType::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum TestType {
    #[sea_orm(iden = "test_types")]
    Table,
    Id,
    TestKey,
    Name,
    Description,
    CategoryId,
    IsEnabled,
    SortOrder,
}
