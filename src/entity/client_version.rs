//! Client version entity.

use sea_orm::entity::prelude::*;
use serde_json::Value as JsonValue;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "client_versions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub version_id: String,
    pub display_name: Option<String>,
    pub sort_order: i32,
    pub is_enabled: bool,
    /// JSON array of test keys testers should mark N/A for this version.
    #[sea_orm(column_type = "Json", nullable)]
    pub skip_tests: Option<JsonValue>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::template_version::Entity")]
    TemplateVersions,
}

impl Related<super::template_version::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TemplateVersions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
