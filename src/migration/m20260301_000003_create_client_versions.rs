//! Create client_versions table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ClientVersion::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ClientVersion::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ClientVersion::VersionId)
                            .string_len(100)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(ClientVersion::DisplayName).string_len(255))
                    .col(
                        ColumnDef::new(ClientVersion::SortOrder)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(ClientVersion::IsEnabled)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(ClientVersion::SkipTests).json())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ClientVersion::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ClientVersion {
    #[sea_orm(iden = "client_versions")]
    Table,
    Id,
    VersionId,
    DisplayName,
    SortOrder,
    IsEnabled,
    SkipTests,
}
