//! Persistent rows of the undo/redo journal.
//!
//! Snapshots are stored as JSON text; see [`crate::history`] for the logic
//! that reads and writes them.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "undo_log")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub action: String,
    #[sea_orm(column_type = "Text")]
    pub before_state: String,
    #[sea_orm(column_type = "Text")]
    pub after_state: String,
    pub undone: bool,
    pub recorded_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
