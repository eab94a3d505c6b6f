//! Create server_metadata table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ServerMetadata::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ServerMetadata::MetaKey)
                            .string_len(100)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ServerMetadata::MetaValue).text().not_null())
                    .col(
                        ColumnDef::new(ServerMetadata::UpdatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ServerMetadata::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ServerMetadata {
    #[sea_orm(iden = "server_metadata")]
    Table,
    MetaKey,
    MetaValue,
    UpdatedAt,
}
