//! Category grouping test definitions for display.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "test_categories")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub name: String,
    pub sort_order: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::test_type::Entity")]
    TestTypes,
}

impl Related<super::test_type::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TestTypes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
