//! Typed external references attached to an entry.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "linked_items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub entry_id: i32,
    pub link_type_id: i32,
    pub value: String,
    pub position: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::entries::Entity",
        from = "Column::EntryId",
        to = "super::entries::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Entries,
    #[sea_orm(
        belongs_to = "super::link_types::Entity",
        from = "Column::LinkTypeId",
        to = "super::link_types::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    LinkTypes,
}

impl Related<super::entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Entries.def()
    }
}

impl Related<super::link_types::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LinkTypes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
