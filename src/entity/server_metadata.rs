//! Key/value metadata about the running server (stored schema version).

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "server_metadata")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub meta_key: String,
    #[sea_orm(column_type = "Text")]
    pub meta_value: String,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
