//! Undo/redo ledger.
//!
//! The ledger is a bounded, linear journal of mutations. Each record stores
//! the snapshots of the affected entries before and after the action:
//!
//! - recording a new action drops every undone record (redo history is
//!   invalidated) and prunes the oldest records beyond the configured depth;
//! - an action whose before and after states are equal is not recorded;
//! - undo replays the most recent live record backwards, redo replays the
//!   oldest undone record forwards.

use chrono::Utc;
use sea_orm::{ActiveValue, ConnectionTrait, QueryFilter, QueryOrder, prelude::*};
use serde::{Deserialize, Serialize};

use crate::{
    EngineError, ResultEngine,
    snapshot::{self, EntrySnapshot},
    undo_log,
};

/// Default number of journaled actions kept.
pub const DEFAULT_HISTORY_DEPTH: usize = 50;

/// The operation that produced an undo record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    CreateEntry,
    UpdateEntry,
    DuplicateEntry,
    DeleteEntry,
    ReorderEntry,
    LinkEntries,
    UngroupEntry,
}

impl ActionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CreateEntry => "create_entry",
            Self::UpdateEntry => "update_entry",
            Self::DuplicateEntry => "duplicate_entry",
            Self::DeleteEntry => "delete_entry",
            Self::ReorderEntry => "reorder_entry",
            Self::LinkEntries => "link_entries",
            Self::UngroupEntry => "ungroup_entry",
        }
    }
}

impl TryFrom<&str> for ActionKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "create_entry" => Ok(Self::CreateEntry),
            "update_entry" => Ok(Self::UpdateEntry),
            "duplicate_entry" => Ok(Self::DuplicateEntry),
            "delete_entry" => Ok(Self::DeleteEntry),
            "reorder_entry" => Ok(Self::ReorderEntry),
            "link_entries" => Ok(Self::LinkEntries),
            "ungroup_entry" => Ok(Self::UngroupEntry),
            other => Err(EngineError::InvalidSnapshot(format!(
                "unknown action kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UndoOutcome {
    Undone { action: ActionKind },
    NothingToUndo,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RedoOutcome {
    Redone { action: ActionKind },
    NothingToRedo,
}

/// Availability of undo and redo, with the action each would act on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct HistoryStatus {
    pub can_undo: bool,
    pub can_redo: bool,
    pub next_undo: Option<ActionKind>,
    pub next_redo: Option<ActionKind>,
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct Ledger {
    depth: usize,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_DEPTH)
    }
}

struct DecodedRecord {
    id: i32,
    action: ActionKind,
    before: Vec<EntrySnapshot>,
    after: Vec<EntrySnapshot>,
}

impl TryFrom<undo_log::Model> for DecodedRecord {
    type Error = EngineError;

    fn try_from(model: undo_log::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            action: ActionKind::try_from(model.action.as_str())?,
            before: decode_state(&model.before_state)?,
            after: decode_state(&model.after_state)?,
        })
    }
}

fn encode_state(state: &[EntrySnapshot]) -> ResultEngine<String> {
    serde_json::to_string(state).map_err(|err| EngineError::InvalidSnapshot(err.to_string()))
}

fn decode_state(raw: &str) -> ResultEngine<Vec<EntrySnapshot>> {
    serde_json::from_str(raw).map_err(|err| EngineError::InvalidSnapshot(err.to_string()))
}

impl Ledger {
    pub(crate) fn new(depth: usize) -> Self {
        Self {
            depth: depth.max(1),
        }
    }

    /// Journal an action. Returns `false` when nothing changed.
    pub(crate) async fn record<C: ConnectionTrait>(
        &self,
        db: &C,
        action: ActionKind,
        before: &[EntrySnapshot],
        after: &[EntrySnapshot],
    ) -> ResultEngine<bool> {
        if before == after {
            return Ok(false);
        }

        undo_log::Entity::delete_many()
            .filter(undo_log::Column::Undone.eq(true))
            .exec(db)
            .await?;

        undo_log::ActiveModel {
            id: ActiveValue::NotSet,
            action: ActiveValue::Set(action.as_str().to_string()),
            before_state: ActiveValue::Set(encode_state(before)?),
            after_state: ActiveValue::Set(encode_state(after)?),
            undone: ActiveValue::Set(false),
            recorded_at: ActiveValue::Set(Utc::now()),
        }
        .insert(db)
        .await?;

        self.prune(db).await?;
        tracing::debug!(
            action = action.as_str(),
            before = before.len(),
            after = after.len(),
            "journaled action"
        );
        Ok(true)
    }

    async fn prune<C: ConnectionTrait>(&self, db: &C) -> ResultEngine<()> {
        let stale: Vec<i32> = undo_log::Entity::find()
            .order_by_desc(undo_log::Column::Id)
            .all(db)
            .await?
            .into_iter()
            .skip(self.depth)
            .map(|model| model.id)
            .collect();
        if stale.is_empty() {
            return Ok(());
        }
        undo_log::Entity::delete_many()
            .filter(undo_log::Column::Id.is_in(stale))
            .exec(db)
            .await?;
        Ok(())
    }

    pub(crate) async fn undo<C: ConnectionTrait>(&self, db: &C) -> ResultEngine<UndoOutcome> {
        let Some(model) = latest_live(db).await? else {
            return Ok(UndoOutcome::NothingToUndo);
        };
        let record = DecodedRecord::try_from(model)?;
        let candidates = snapshot::affected_ids(&record.before, &record.after);
        snapshot::restore(db, &record.before, &candidates).await?;
        set_undone(db, record.id, true).await?;

        tracing::info!(action = record.action.as_str(), "undid action");
        Ok(UndoOutcome::Undone {
            action: record.action,
        })
    }

    pub(crate) async fn redo<C: ConnectionTrait>(&self, db: &C) -> ResultEngine<RedoOutcome> {
        let Some(model) = oldest_undone(db).await? else {
            return Ok(RedoOutcome::NothingToRedo);
        };
        let record = DecodedRecord::try_from(model)?;
        let candidates = snapshot::affected_ids(&record.before, &record.after);
        snapshot::restore(db, &record.after, &candidates).await?;
        set_undone(db, record.id, false).await?;

        tracing::info!(action = record.action.as_str(), "redid action");
        Ok(RedoOutcome::Redone {
            action: record.action,
        })
    }

    pub(crate) async fn status<C: ConnectionTrait>(&self, db: &C) -> ResultEngine<HistoryStatus> {
        let next_undo = latest_live(db)
            .await?
            .map(|model| ActionKind::try_from(model.action.as_str()))
            .transpose()?;
        let next_redo = oldest_undone(db)
            .await?
            .map(|model| ActionKind::try_from(model.action.as_str()))
            .transpose()?;
        Ok(HistoryStatus {
            can_undo: next_undo.is_some(),
            can_redo: next_redo.is_some(),
            next_undo,
            next_redo,
        })
    }
}

async fn latest_live<C: ConnectionTrait>(db: &C) -> ResultEngine<Option<undo_log::Model>> {
    Ok(undo_log::Entity::find()
        .filter(undo_log::Column::Undone.eq(false))
        .order_by_desc(undo_log::Column::Id)
        .one(db)
        .await?)
}

async fn oldest_undone<C: ConnectionTrait>(db: &C) -> ResultEngine<Option<undo_log::Model>> {
    Ok(undo_log::Entity::find()
        .filter(undo_log::Column::Undone.eq(true))
        .order_by_asc(undo_log::Column::Id)
        .one(db)
        .await?)
}

async fn set_undone<C: ConnectionTrait>(db: &C, id: i32, undone: bool) -> ResultEngine<()> {
    undo_log::ActiveModel {
        id: ActiveValue::Unchanged(id),
        undone: ActiveValue::Set(undone),
        ..Default::default()
    }
    .update(db)
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_kind_round_trips_through_storage_name() {
        for kind in [
            ActionKind::CreateEntry,
            ActionKind::UpdateEntry,
            ActionKind::DuplicateEntry,
            ActionKind::DeleteEntry,
            ActionKind::ReorderEntry,
            ActionKind::LinkEntries,
            ActionKind::UngroupEntry,
        ] {
            assert_eq!(ActionKind::try_from(kind.as_str()), Ok(kind));
        }
    }

    #[test]
    fn unknown_action_kind_is_an_invalid_snapshot() {
        assert!(matches!(
            ActionKind::try_from("rename_entry"),
            Err(EngineError::InvalidSnapshot(_))
        ));
    }

    #[test]
    fn corrupt_state_is_reported() {
        assert!(matches!(
            decode_state("{not json"),
            Err(EngineError::InvalidSnapshot(_))
        ));
    }

    #[test]
    fn depth_is_at_least_one() {
        assert_eq!(Ledger::new(0).depth, 1);
        assert_eq!(Ledger::default().depth, DEFAULT_HISTORY_DEPTH);
    }
}
