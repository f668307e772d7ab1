//! Entries: units of recorded work for a calendar day.
//!
//! An entry owns an ordered list of splits and an ordered list of linked
//! items. Entries that share a non-null `group_id` form a group; a group never
//! has exactly one member.

use chrono::NaiveDate;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Entry as returned to callers, with its children resolved.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryView {
    pub id: i32,
    pub date: NaiveDate,
    /// Duration in minutes.
    pub duration: i32,
    pub description: String,
    pub notes: String,
    pub group_id: Option<String>,
    pub sort_order: Option<i32>,
    pub splits: Vec<SplitView>,
    pub linked_items: Vec<LinkedItemView>,
}

/// A split with the referenced account's display fields attached.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitView {
    pub account_id: i32,
    pub account_number: String,
    pub account_description: String,
    pub account_project: String,
    pub duration: i32,
    pub position: i32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedItemView {
    pub link_type_id: i32,
    pub value: String,
    pub position: i32,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "entries")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub date: NaiveDate,
    pub duration: i32,
    pub description: String,
    pub notes: String,
    pub group_id: Option<String>,
    pub sort_order: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::splits::Entity")]
    Splits,
    #[sea_orm(has_many = "super::linked_items::Entity")]
    LinkedItems,
}

impl Related<super::splits::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Splits.def()
    }
}

impl Related<super::linked_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LinkedItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
