//! Record-level access to the entry tables.
//!
//! Mutation code never builds queries itself: it goes through these
//! primitives (point and bulk lookups, predicate lookups, insert, partial
//! update, cascading delete, child replacement). Every function takes the
//! connection it runs on, which in practice is the transaction of the
//! current operation.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use sea_orm::{ActiveValue, ConnectionTrait, QueryFilter, QueryOrder, prelude::*};

use crate::{
    EngineError, ResultEngine, accounts, entries, linked_items,
    snapshot::{LinkedItemSnapshot, SplitSnapshot},
    splits,
};

/// Every scalar column of an entry except its id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct EntryRow {
    pub(crate) date: NaiveDate,
    pub(crate) duration: i32,
    pub(crate) description: String,
    pub(crate) notes: String,
    pub(crate) group_id: Option<String>,
    pub(crate) sort_order: Option<i32>,
}

/// Partial set of entry columns; `None` leaves the column untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct EntryRowPatch {
    pub(crate) date: Option<NaiveDate>,
    pub(crate) duration: Option<i32>,
    pub(crate) description: Option<String>,
    pub(crate) notes: Option<String>,
    pub(crate) group_id: Option<Option<String>>,
    pub(crate) sort_order: Option<Option<i32>>,
}

impl EntryRowPatch {
    pub(crate) fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl From<EntryRow> for EntryRowPatch {
    fn from(row: EntryRow) -> Self {
        Self {
            date: Some(row.date),
            duration: Some(row.duration),
            description: Some(row.description),
            notes: Some(row.notes),
            group_id: Some(row.group_id),
            sort_order: Some(row.sort_order),
        }
    }
}

pub(crate) async fn find_entry<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> ResultEngine<Option<entries::Model>> {
    Ok(entries::Entity::find_by_id(id).one(db).await?)
}

pub(crate) async fn require_entry<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> ResultEngine<entries::Model> {
    find_entry(db, id)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound(format!("entry {id}")))
}

/// Entries with the given ids, ordered by id. Missing ids are skipped.
pub(crate) async fn find_entries<C: ConnectionTrait>(
    db: &C,
    ids: &BTreeSet<i32>,
) -> ResultEngine<Vec<entries::Model>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    Ok(entries::Entity::find()
        .filter(entries::Column::Id.is_in(ids.iter().copied()))
        .order_by_asc(entries::Column::Id)
        .all(db)
        .await?)
}

pub(crate) async fn group_members<C: ConnectionTrait>(
    db: &C,
    group_id: &str,
) -> ResultEngine<Vec<entries::Model>> {
    Ok(entries::Entity::find()
        .filter(entries::Column::GroupId.eq(group_id))
        .order_by_asc(entries::Column::Id)
        .all(db)
        .await?)
}

pub(crate) async fn entries_on_date<C: ConnectionTrait>(
    db: &C,
    date: NaiveDate,
) -> ResultEngine<Vec<entries::Model>> {
    Ok(entries::Entity::find()
        .filter(entries::Column::Date.eq(date))
        .order_by_asc(entries::Column::Id)
        .all(db)
        .await?)
}

/// Entries in the inclusive `[from, to]` range, newest day first.
///
/// Within a day, entries with an explicit sort position come first in
/// position order, followed by the others in id order.
pub(crate) async fn entries_between<C: ConnectionTrait>(
    db: &C,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> ResultEngine<Vec<entries::Model>> {
    let mut query = entries::Entity::find();
    if let Some(from) = from {
        query = query.filter(entries::Column::Date.gte(from));
    }
    if let Some(to) = to {
        query = query.filter(entries::Column::Date.lte(to));
    }
    let mut models = query
        .order_by_desc(entries::Column::Date)
        .order_by_asc(entries::Column::Id)
        .all(db)
        .await?;
    models.sort_by(|a, b| {
        b.date
            .cmp(&a.date)
            .then_with(|| a.sort_order.is_none().cmp(&b.sort_order.is_none()))
            .then_with(|| a.sort_order.cmp(&b.sort_order))
            .then_with(|| a.id.cmp(&b.id))
    });
    Ok(models)
}

/// Insert an entry. With `id` set the row is written under that id, which is
/// how a deleted entry is resurrected.
pub(crate) async fn insert_entry<C: ConnectionTrait>(
    db: &C,
    id: Option<i32>,
    row: EntryRow,
) -> ResultEngine<entries::Model> {
    let active = entries::ActiveModel {
        id: id.map_or(ActiveValue::NotSet, ActiveValue::Set),
        date: ActiveValue::Set(row.date),
        duration: ActiveValue::Set(row.duration),
        description: ActiveValue::Set(row.description),
        notes: ActiveValue::Set(row.notes),
        group_id: ActiveValue::Set(row.group_id),
        sort_order: ActiveValue::Set(row.sort_order),
    };
    Ok(active.insert(db).await?)
}

pub(crate) async fn update_entry<C: ConnectionTrait>(
    db: &C,
    id: i32,
    patch: EntryRowPatch,
) -> ResultEngine<entries::Model> {
    if patch.is_empty() {
        return require_entry(db, id).await;
    }

    let mut active = entries::ActiveModel {
        id: ActiveValue::Unchanged(id),
        ..Default::default()
    };
    if let Some(date) = patch.date {
        active.date = ActiveValue::Set(date);
    }
    if let Some(duration) = patch.duration {
        active.duration = ActiveValue::Set(duration);
    }
    if let Some(description) = patch.description {
        active.description = ActiveValue::Set(description);
    }
    if let Some(notes) = patch.notes {
        active.notes = ActiveValue::Set(notes);
    }
    if let Some(group_id) = patch.group_id {
        active.group_id = ActiveValue::Set(group_id);
    }
    if let Some(sort_order) = patch.sort_order {
        active.sort_order = ActiveValue::Set(sort_order);
    }
    Ok(active.update(db).await?)
}

/// Delete an entry together with its splits and linked items.
pub(crate) async fn delete_entry<C: ConnectionTrait>(db: &C, id: i32) -> ResultEngine<()> {
    splits::Entity::delete_many()
        .filter(splits::Column::EntryId.eq(id))
        .exec(db)
        .await?;
    linked_items::Entity::delete_many()
        .filter(linked_items::Column::EntryId.eq(id))
        .exec(db)
        .await?;
    entries::Entity::delete_by_id(id).exec(db).await?;
    Ok(())
}

/// Splits of the given entries, ordered by entry then position.
pub(crate) async fn splits_of<C: ConnectionTrait>(
    db: &C,
    entry_ids: &BTreeSet<i32>,
) -> ResultEngine<Vec<splits::Model>> {
    if entry_ids.is_empty() {
        return Ok(Vec::new());
    }
    Ok(splits::Entity::find()
        .filter(splits::Column::EntryId.is_in(entry_ids.iter().copied()))
        .order_by_asc(splits::Column::EntryId)
        .order_by_asc(splits::Column::Position)
        .all(db)
        .await?)
}

/// Linked items of the given entries, ordered by entry then position.
pub(crate) async fn linked_items_of<C: ConnectionTrait>(
    db: &C,
    entry_ids: &BTreeSet<i32>,
) -> ResultEngine<Vec<linked_items::Model>> {
    if entry_ids.is_empty() {
        return Ok(Vec::new());
    }
    Ok(linked_items::Entity::find()
        .filter(linked_items::Column::EntryId.is_in(entry_ids.iter().copied()))
        .order_by_asc(linked_items::Column::EntryId)
        .order_by_asc(linked_items::Column::Position)
        .all(db)
        .await?)
}

/// Replace all splits of an entry, inserting them in position order.
pub(crate) async fn replace_splits<C: ConnectionTrait>(
    db: &C,
    entry_id: i32,
    items: &[SplitSnapshot],
) -> ResultEngine<()> {
    splits::Entity::delete_many()
        .filter(splits::Column::EntryId.eq(entry_id))
        .exec(db)
        .await?;

    let mut ordered: Vec<&SplitSnapshot> = items.iter().collect();
    ordered.sort_by_key(|split| split.position);
    for split in ordered {
        splits::ActiveModel {
            id: ActiveValue::NotSet,
            entry_id: ActiveValue::Set(entry_id),
            account_id: ActiveValue::Set(split.account_id),
            duration: ActiveValue::Set(split.duration),
            position: ActiveValue::Set(split.position),
        }
        .insert(db)
        .await?;
    }
    Ok(())
}

/// Replace all linked items of an entry, inserting them in position order.
pub(crate) async fn replace_linked_items<C: ConnectionTrait>(
    db: &C,
    entry_id: i32,
    items: &[LinkedItemSnapshot],
) -> ResultEngine<()> {
    linked_items::Entity::delete_many()
        .filter(linked_items::Column::EntryId.eq(entry_id))
        .exec(db)
        .await?;

    let mut ordered: Vec<&LinkedItemSnapshot> = items.iter().collect();
    ordered.sort_by_key(|item| item.position);
    for item in ordered {
        linked_items::ActiveModel {
            id: ActiveValue::NotSet,
            entry_id: ActiveValue::Set(entry_id),
            link_type_id: ActiveValue::Set(item.link_type_id),
            value: ActiveValue::Set(item.value.clone()),
            position: ActiveValue::Set(item.position),
        }
        .insert(db)
        .await?;
    }
    Ok(())
}

pub(crate) async fn accounts_by_ids<C: ConnectionTrait>(
    db: &C,
    ids: &BTreeSet<i32>,
) -> ResultEngine<Vec<accounts::Model>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    Ok(accounts::Entity::find()
        .filter(accounts::Column::Id.is_in(ids.iter().copied()))
        .all(db)
        .await?)
}
