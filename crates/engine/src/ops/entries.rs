use std::collections::{BTreeSet, HashMap};

use chrono::NaiveDate;
use sea_orm::ConnectionTrait;

use crate::{
    EngineError, EntryNew, EntryPatch, EntryView, ResultEngine, entries,
    entries::{LinkedItemView, SplitView},
    grouping,
    history::ActionKind,
    snapshot,
    store::{self, EntryRow, EntryRowPatch},
};

use super::{Engine, resolve_linked_items, resolve_splits, validate_duration, with_tx};

/// Filters for listing entries. Both bounds are inclusive.
#[derive(Clone, Debug, Default)]
pub struct EntryListFilter {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

fn validate_list_filter(filter: &EntryListFilter) -> ResultEngine<()> {
    if let (Some(from), Some(to)) = (filter.from, filter.to)
        && from > to
    {
        return Err(EngineError::InvalidInput(
            "invalid range: from must be <= to".to_string(),
        ));
    }
    Ok(())
}

/// Attach children and account display fields to entry rows, keeping order.
pub(super) async fn entry_views<C: ConnectionTrait>(
    db: &C,
    models: Vec<entries::Model>,
) -> ResultEngine<Vec<EntryView>> {
    let ids: BTreeSet<i32> = models.iter().map(|model| model.id).collect();
    let split_models = store::splits_of(db, &ids).await?;
    let account_ids: BTreeSet<i32> = split_models.iter().map(|split| split.account_id).collect();
    let accounts: HashMap<i32, crate::accounts::Model> = store::accounts_by_ids(db, &account_ids)
        .await?
        .into_iter()
        .map(|account| (account.id, account))
        .collect();

    let mut splits: HashMap<i32, Vec<SplitView>> = HashMap::new();
    for split in split_models {
        let account = accounts.get(&split.account_id);
        splits.entry(split.entry_id).or_default().push(SplitView {
            account_id: split.account_id,
            account_number: account.map(|a| a.number.clone()).unwrap_or_default(),
            account_description: account.map(|a| a.description.clone()).unwrap_or_default(),
            account_project: account.map(|a| a.project.clone()).unwrap_or_default(),
            duration: split.duration,
            position: split.position,
        });
    }

    let mut linked_items: HashMap<i32, Vec<LinkedItemView>> = HashMap::new();
    for item in store::linked_items_of(db, &ids).await? {
        linked_items
            .entry(item.entry_id)
            .or_default()
            .push(LinkedItemView {
                link_type_id: item.link_type_id,
                value: item.value,
                position: item.position,
            });
    }

    Ok(models
        .into_iter()
        .map(|model| EntryView {
            splits: splits.remove(&model.id).unwrap_or_default(),
            linked_items: linked_items.remove(&model.id).unwrap_or_default(),
            id: model.id,
            date: model.date,
            duration: model.duration,
            description: model.description,
            notes: model.notes,
            group_id: model.group_id,
            sort_order: model.sort_order,
        })
        .collect())
}

pub(super) async fn entry_view<C: ConnectionTrait>(db: &C, id: i32) -> ResultEngine<EntryView> {
    let model = store::require_entry(db, id).await?;
    entry_views(db, vec![model])
        .await?
        .pop()
        .ok_or_else(|| EngineError::KeyNotFound(format!("entry {id}")))
}

impl Engine {
    /// List entries, newest day first.
    pub async fn list_entries(&self, filter: &EntryListFilter) -> ResultEngine<Vec<EntryView>> {
        validate_list_filter(filter)?;
        with_tx!(self, |db_tx| {
            let models = store::entries_between(&db_tx, filter.from, filter.to).await?;
            entry_views(&db_tx, models).await
        })
    }

    pub async fn entry(&self, entry_id: i32) -> ResultEngine<EntryView> {
        with_tx!(self, |db_tx| entry_view(&db_tx, entry_id).await)
    }

    /// Create an entry with its splits and linked items.
    pub async fn create_entry(&self, cmd: EntryNew) -> ResultEngine<EntryView> {
        validate_duration(cmd.duration, "entry")?;
        with_tx!(self, |db_tx| {
            let splits = resolve_splits(&db_tx, &cmd.splits).await?;
            let linked_items = resolve_linked_items(&db_tx, &cmd.linked_items).await?;

            let model = store::insert_entry(
                &db_tx,
                None,
                EntryRow {
                    date: cmd.date,
                    duration: cmd.duration,
                    description: cmd.description,
                    notes: cmd.notes,
                    group_id: None,
                    sort_order: None,
                },
            )
            .await?;
            store::replace_splits(&db_tx, model.id, &splits).await?;
            store::replace_linked_items(&db_tx, model.id, &linked_items).await?;

            self.journal(
                &db_tx,
                ActionKind::CreateEntry,
                &[],
                &BTreeSet::from([model.id]),
            )
            .await?;
            entry_view(&db_tx, model.id).await
        })
    }

    /// Update an entry.
    ///
    /// Shared fields (see [`crate::SharedField`]) are written to every member
    /// of the entry's group, and the whole group is journaled. Moving an entry
    /// to another day drops its explicit sort position.
    pub async fn update_entry(&self, entry_id: i32, patch: EntryPatch) -> ResultEngine<EntryView> {
        if let Some(duration) = patch.duration {
            validate_duration(duration, "entry")?;
        }
        with_tx!(self, |db_tx| {
            let entry = store::require_entry(&db_tx, entry_id).await?;
            let shared = grouping::shared_updates(&patch);
            let scope = if shared.is_empty() {
                BTreeSet::from([entry.id])
            } else {
                grouping::group_scope(&db_tx, &entry).await?
            };
            let before = snapshot::capture(&db_tx, &scope).await?;

            let splits = match &patch.splits {
                Some(splits) => Some(resolve_splits(&db_tx, splits).await?),
                None => None,
            };
            let linked_items = match &patch.linked_items {
                Some(items) => Some(resolve_linked_items(&db_tx, items).await?),
                None => None,
            };

            let moved_day = patch.date.filter(|date| *date != entry.date);
            store::update_entry(
                &db_tx,
                entry.id,
                EntryRowPatch {
                    date: patch.date,
                    duration: patch.duration,
                    description: patch.description.clone(),
                    notes: patch.notes.clone(),
                    group_id: None,
                    sort_order: moved_day.map(|_| None),
                },
            )
            .await?;
            if let Some(splits) = splits {
                store::replace_splits(&db_tx, entry.id, &splits).await?;
            }
            if let Some(linked_items) = linked_items {
                store::replace_linked_items(&db_tx, entry.id, &linked_items).await?;
            }

            for member in scope.iter().filter(|id| **id != entry.id) {
                store::update_entry(&db_tx, *member, shared.clone()).await?;
            }
            if scope.len() > 1 {
                tracing::debug!(entry_id, members = scope.len(), "propagated shared fields");
            }

            self.journal(&db_tx, ActionKind::UpdateEntry, &before, &scope)
                .await?;
            entry_view(&db_tx, entry.id).await
        })
    }

    /// Copy an entry to `date`.
    ///
    /// With `link` set, the copy joins the source's group, minting one (and
    /// assigning it to the source) when the source has none.
    pub async fn duplicate_entry(
        &self,
        entry_id: i32,
        date: NaiveDate,
        link: bool,
    ) -> ResultEngine<EntryView> {
        with_tx!(self, |db_tx| {
            let source = store::require_entry(&db_tx, entry_id).await?;
            let mut scope = BTreeSet::new();
            if link && source.group_id.is_none() {
                scope.insert(source.id);
            }
            let before = snapshot::capture(&db_tx, &scope).await?;
            let source_state = snapshot::capture(&db_tx, &BTreeSet::from([source.id]))
                .await?
                .pop()
                .ok_or_else(|| EngineError::KeyNotFound(format!("entry {entry_id}")))?;

            let group_id = match (link, &source.group_id) {
                (false, _) => None,
                (true, Some(group_id)) => Some(group_id.clone()),
                (true, None) => {
                    let group_id = grouping::new_group_id();
                    store::update_entry(
                        &db_tx,
                        source.id,
                        EntryRowPatch {
                            group_id: Some(Some(group_id.clone())),
                            ..Default::default()
                        },
                    )
                    .await?;
                    Some(group_id)
                }
            };

            let copy = store::insert_entry(
                &db_tx,
                None,
                EntryRow {
                    date,
                    duration: source.duration,
                    description: source.description.clone(),
                    notes: source.notes.clone(),
                    group_id,
                    sort_order: None,
                },
            )
            .await?;
            store::replace_splits(&db_tx, copy.id, &source_state.splits).await?;
            store::replace_linked_items(&db_tx, copy.id, &source_state.linked_items).await?;

            scope.insert(copy.id);
            self.journal(&db_tx, ActionKind::DuplicateEntry, &before, &scope)
                .await?;
            entry_view(&db_tx, copy.id).await
        })
    }

    /// Delete an entry and its children, dissolving its group if only one
    /// member would remain.
    pub async fn delete_entry(&self, entry_id: i32) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let entry = store::require_entry(&db_tx, entry_id).await?;
            let scope = grouping::group_scope(&db_tx, &entry).await?;
            let before = snapshot::capture(&db_tx, &scope).await?;

            store::delete_entry(&db_tx, entry.id).await?;
            if let Some(group_id) = &entry.group_id {
                grouping::dissolve_if_single(&db_tx, group_id).await?;
            }

            self.journal(&db_tx, ActionKind::DeleteEntry, &before, &scope)
                .await?;
            Ok(())
        })
    }
}
