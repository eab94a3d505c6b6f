//! Assignment of a template to a client version.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "template_versions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub template_id: i64,
    #[sea_orm(primary_key, auto_increment = false)]
    pub client_version_id: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::test_template::Entity",
        from = "Column::TemplateId",
        to = "super::test_template::Column::Id",
        on_delete = "Cascade"
    )]
    Template,
    #[sea_orm(
        belongs_to = "super::client_version::Entity",
        from = "Column::ClientVersionId",
        to = "super::client_version::Column::Id",
        on_delete = "Cascade"
    )]
    ClientVersion,
}

impl Related<super::test_template::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Template.def()
    }
}

impl Related<super::client_version::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ClientVersion.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
