//! Link type catalog.
//!
//! A link type names a kind of external reference (work item, pull request)
//! and carries the URL template clients use to render its values.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkType {
    pub id: i32,
    pub title: String,
    pub url_template: String,
    pub position: i32,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "link_types")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    pub url_template: String,
    pub position: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::linked_items::Entity")]
    LinkedItems,
}

impl Related<super::linked_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LinkedItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for LinkType {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            url_template: model.url_template,
            position: model.position,
        }
    }
}
