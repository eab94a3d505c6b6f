//! Create api_keys table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ApiKey::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ApiKey::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ApiKey::KeyHash)
                            .string_len(64)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(ApiKey::KeyPrefix).string_len(8).not_null())
                    .col(ColumnDef::new(ApiKey::Name).string_len(255).not_null())
                    .col(
                        ColumnDef::new(ApiKey::Role)
                            .string_len(20)
                            .not_null()
                            .default("tester"),
                    )
                    .col(ColumnDef::new(ApiKey::ExpiresAt).timestamp().null())
                    .col(
                        ColumnDef::new(ApiKey::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(ApiKey::DeletedAt).timestamp().null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ApiKey::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ApiKey {
    #[sea_orm(iden = "api_keys")]
    Table,
    Id,
    KeyHash,
    KeyPrefix,
    Name,
    Role,
    ExpiresAt,
    CreatedAt,
    DeletedAt,
}
