//! Self-contained captures of entry state.
//!
//! A snapshot holds every scalar of an entry plus its ordered splits and
//! linked items. Snapshots are plain values: they compare structurally, carry
//! no reference back into the store and serialize to JSON for the undo log.
//!
//! Restoring is replace-not-diff: an entry's children are deleted and
//! re-inserted from the snapshot, so the restored rows match exactly.

use std::collections::{BTreeSet, HashMap};

use chrono::NaiveDate;
use sea_orm::ConnectionTrait;
use serde::{Deserialize, Serialize};

use crate::{
    ResultEngine, entries,
    store::{self, EntryRow},
};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct EntrySnapshot {
    pub(crate) id: i32,
    pub(crate) date: NaiveDate,
    pub(crate) duration: i32,
    pub(crate) description: String,
    pub(crate) notes: String,
    pub(crate) group_id: Option<String>,
    pub(crate) sort_order: Option<i32>,
    pub(crate) splits: Vec<SplitSnapshot>,
    pub(crate) linked_items: Vec<LinkedItemSnapshot>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct SplitSnapshot {
    pub(crate) account_id: i32,
    pub(crate) duration: i32,
    pub(crate) position: i32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct LinkedItemSnapshot {
    pub(crate) link_type_id: i32,
    pub(crate) value: String,
    pub(crate) position: i32,
}

impl EntrySnapshot {
    fn from_model(
        model: entries::Model,
        splits: Vec<SplitSnapshot>,
        linked_items: Vec<LinkedItemSnapshot>,
    ) -> Self {
        Self {
            id: model.id,
            date: model.date,
            duration: model.duration,
            description: model.description,
            notes: model.notes,
            group_id: model.group_id,
            sort_order: model.sort_order,
            splits,
            linked_items,
        }
    }

    pub(crate) fn row(&self) -> EntryRow {
        EntryRow {
            date: self.date,
            duration: self.duration,
            description: self.description.clone(),
            notes: self.notes.clone(),
            group_id: self.group_id.clone(),
            sort_order: self.sort_order,
        }
    }
}

/// Ids present in either state list.
pub(crate) fn affected_ids(before: &[EntrySnapshot], after: &[EntrySnapshot]) -> BTreeSet<i32> {
    before.iter().chain(after).map(|state| state.id).collect()
}

/// Capture the current state of `ids`, ordered by id.
///
/// Ids that do not exist are left out, so capturing after a delete yields a
/// shorter list than capturing before it.
pub(crate) async fn capture<C: ConnectionTrait>(
    db: &C,
    ids: &BTreeSet<i32>,
) -> ResultEngine<Vec<EntrySnapshot>> {
    let models = store::find_entries(db, ids).await?;
    if models.is_empty() {
        return Ok(Vec::new());
    }

    let mut splits: HashMap<i32, Vec<SplitSnapshot>> = HashMap::new();
    for split in store::splits_of(db, ids).await? {
        splits.entry(split.entry_id).or_default().push(SplitSnapshot {
            account_id: split.account_id,
            duration: split.duration,
            position: split.position,
        });
    }

    let mut linked_items: HashMap<i32, Vec<LinkedItemSnapshot>> = HashMap::new();
    for item in store::linked_items_of(db, ids).await? {
        linked_items
            .entry(item.entry_id)
            .or_default()
            .push(LinkedItemSnapshot {
                link_type_id: item.link_type_id,
                value: item.value,
                position: item.position,
            });
    }

    Ok(models
        .into_iter()
        .map(|model| {
            let id = model.id;
            EntrySnapshot::from_model(
                model,
                splits.remove(&id).unwrap_or_default(),
                linked_items.remove(&id).unwrap_or_default(),
            )
        })
        .collect())
}

/// Make the store match `target` for every id in `candidates`.
///
/// `candidates` must contain every id of `target`.
///
/// Candidates missing from `target` are deleted; target entries are updated
/// in place or re-inserted under their original id, then their children are
/// replaced wholesale.
pub(crate) async fn restore<C: ConnectionTrait>(
    db: &C,
    target: &[EntrySnapshot],
    candidates: &BTreeSet<i32>,
) -> ResultEngine<()> {
    let keep: BTreeSet<i32> = target.iter().map(|state| state.id).collect();
    let existing: BTreeSet<i32> = store::find_entries(db, candidates)
        .await?
        .into_iter()
        .map(|model| model.id)
        .collect();

    for id in existing.difference(&keep) {
        store::delete_entry(db, *id).await?;
    }

    for state in target {
        if existing.contains(&state.id) {
            store::update_entry(db, state.id, state.row().into()).await?;
        } else {
            store::insert_entry(db, Some(state.id), state.row()).await?;
        }
        store::replace_splits(db, state.id, &state.splits).await?;
        store::replace_linked_items(db, state.id, &state.linked_items).await?;
    }

    Ok(())
}
