use std::collections::{BTreeSet, HashMap};

use crate::{
    EngineError, EntryView, ResultEngine, Suggestion,
    grouping::{self, day_order, merge_linked_items, rank_candidates, splice_order},
    history::ActionKind,
    snapshot,
    store::{self, EntryRowPatch},
};

use super::{
    Engine,
    entries::{entry_view, entry_views},
    with_tx,
};

impl Engine {
    /// Link `source_id` into the group of `target_id`.
    ///
    /// Both prior groups are merged into one. Every member receives the
    /// resolved shared fields and the union of all members' linked items.
    pub async fn link_entries(
        &self,
        source_id: i32,
        target_id: i32,
        resolution: Option<&HashMap<String, String>>,
    ) -> ResultEngine<EntryView> {
        if source_id == target_id {
            return Err(EngineError::InvalidInput(
                "an entry cannot be linked to itself".to_string(),
            ));
        }
        with_tx!(self, |db_tx| {
            let source = store::require_entry(&db_tx, source_id).await?;
            let target = store::require_entry(&db_tx, target_id).await?;

            let group_id = target
                .group_id
                .clone()
                .or_else(|| source.group_id.clone())
                .unwrap_or_else(grouping::new_group_id);

            let mut scope = grouping::group_scope(&db_tx, &source).await?;
            scope.extend(grouping::group_scope(&db_tx, &target).await?);
            let before = snapshot::capture(&db_tx, &scope).await?;

            let shared = grouping::resolve_shared(resolution, &target);
            let merged = merge_linked_items(&before);
            for member in &scope {
                store::update_entry(
                    &db_tx,
                    *member,
                    EntryRowPatch {
                        group_id: Some(Some(group_id.clone())),
                        ..shared.clone()
                    },
                )
                .await?;
                store::replace_linked_items(&db_tx, *member, &merged).await?;
            }
            tracing::debug!(
                source_id,
                target_id,
                group_id = group_id.as_str(),
                members = scope.len(),
                "linked entries"
            );

            self.journal(&db_tx, ActionKind::LinkEntries, &before, &scope)
                .await?;
            entry_view(&db_tx, source.id).await
        })
    }

    /// Remove an entry from its group. A group left with one member is
    /// dissolved. Ungrouping an entry without a group is a no-op.
    pub async fn ungroup_entry(&self, entry_id: i32) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let entry = store::require_entry(&db_tx, entry_id).await?;
            let Some(group_id) = entry.group_id.clone() else {
                return Ok(());
            };

            let scope = grouping::group_scope(&db_tx, &entry).await?;
            let before = snapshot::capture(&db_tx, &scope).await?;

            store::update_entry(
                &db_tx,
                entry.id,
                EntryRowPatch {
                    group_id: Some(None),
                    ..Default::default()
                },
            )
            .await?;
            grouping::dissolve_if_single(&db_tx, &group_id).await?;

            self.journal(&db_tx, ActionKind::UngroupEntry, &before, &scope)
                .await?;
            Ok(())
        })
    }

    /// Move an entry within its day, immediately before `before_id` or last.
    ///
    /// Every entry of the day gets a dense zero-based position.
    pub async fn reorder_entry(&self, entry_id: i32, before_id: Option<i32>) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let entry = store::require_entry(&db_tx, entry_id).await?;
            if before_id == Some(entry_id) {
                return Ok(());
            }
            let mut day = store::entries_on_date(&db_tx, entry.date).await?;
            day_order(&mut day);

            let current: Vec<i32> = day.iter().map(|model| model.id).collect();
            let ordered = splice_order(&current, entry.id, before_id);
            let scope: BTreeSet<i32> = ordered.iter().copied().collect();
            let before = snapshot::capture(&db_tx, &scope).await?;

            for (position, model) in ordered.iter().enumerate() {
                let position = position as i32;
                let unchanged = day
                    .iter()
                    .any(|m| m.id == *model && m.sort_order == Some(position));
                if unchanged {
                    continue;
                }
                store::update_entry(
                    &db_tx,
                    *model,
                    EntryRowPatch {
                        sort_order: Some(Some(position)),
                        ..Default::default()
                    },
                )
                .await?;
            }

            self.journal(&db_tx, ActionKind::ReorderEntry, &before, &scope)
                .await?;
            Ok(())
        })
    }

    /// Rank entries that could be grouped with `entry_id`. Read-only.
    ///
    /// Every entry outside the source's group is ranked; `limit` keeps only
    /// the best ones.
    pub async fn suggest_links(
        &self,
        entry_id: i32,
        limit: Option<usize>,
    ) -> ResultEngine<Vec<Suggestion>> {
        with_tx!(self, |db_tx| {
            let source = snapshot::capture(&db_tx, &BTreeSet::from([entry_id]))
                .await?
                .pop()
                .ok_or_else(|| EngineError::KeyNotFound(format!("entry {entry_id}")))?;

            let ids: BTreeSet<i32> = store::entries_between(&db_tx, None, None)
                .await?
                .into_iter()
                .map(|model| model.id)
                .collect();
            let candidates = snapshot::capture(&db_tx, &ids).await?;
            let mut ranked = rank_candidates(&source, candidates);
            if let Some(limit) = limit {
                ranked.truncate(limit);
            }

            let ranked_ids: BTreeSet<i32> = ranked.iter().map(|(state, _)| state.id).collect();
            let mut views: HashMap<i32, EntryView> =
                entry_views(&db_tx, store::find_entries(&db_tx, &ranked_ids).await?)
                    .await?
                    .into_iter()
                    .map(|view| (view.id, view))
                    .collect();

            Ok(ranked
                .into_iter()
                .filter_map(|(state, score)| {
                    views
                        .remove(&state.id)
                        .map(|entry| Suggestion { entry, score })
                })
                .collect())
        })
    }
}
