//! Group membership, shared-field propagation, linked-item merging,
//! day reordering and similarity scoring.
//!
//! The pure helpers here take snapshots and models as input so they can be
//! tested without a database; the async helpers read membership through the
//! store.

use std::collections::{BTreeSet, HashMap, HashSet};

use sea_orm::ConnectionTrait;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    EntryPatch, EntryView, ResultEngine, entries,
    snapshot::{EntrySnapshot, LinkedItemSnapshot},
    store::{self, EntryRowPatch},
};

const SHARED_PAIR_SCORE: u32 = 10;
const DESCRIPTION_MATCH_SCORE: u32 = 3;
const GROUPED_SCORE: u32 = 1;

/// Fields kept identical across every member of a group.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SharedField {
    Description,
}

impl SharedField {
    pub const ALL: [Self; 1] = [Self::Description];

    pub fn key(self) -> &'static str {
        match self {
            Self::Description => "description",
        }
    }

    /// Unknown keys map to `None` and are ignored by callers.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.key() == key)
    }

    fn value_of(self, model: &entries::Model) -> String {
        match self {
            Self::Description => model.description.clone(),
        }
    }

    fn apply(self, patch: &mut EntryRowPatch, value: String) {
        match self {
            Self::Description => patch.description = Some(value),
        }
    }
}

/// A candidate entry for grouping with its similarity score.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    pub entry: EntryView,
    pub score: u32,
}

pub(crate) fn new_group_id() -> String {
    Uuid::new_v4().to_string()
}

/// The shared-field part of an entry update.
pub(crate) fn shared_updates(patch: &EntryPatch) -> EntryRowPatch {
    let mut shared = EntryRowPatch::default();
    for field in SharedField::ALL {
        let value = match field {
            SharedField::Description => patch.description.clone(),
        };
        if let Some(value) = value {
            field.apply(&mut shared, value);
        }
    }
    shared
}

/// Shared values a link writes to every member of the resulting group.
///
/// Every shared field starts from the target's current value; a resolution
/// map overrides the fields it names. Unknown keys are dropped.
pub(crate) fn resolve_shared(
    resolution: Option<&HashMap<String, String>>,
    target: &entries::Model,
) -> EntryRowPatch {
    let mut shared = EntryRowPatch::default();
    for field in SharedField::ALL {
        let value = resolution
            .and_then(|resolution| resolution.get(field.key()))
            .cloned()
            .unwrap_or_else(|| field.value_of(target));
        field.apply(&mut shared, value);
    }
    shared
}

/// Union of the linked items of `states`, unique by (link type, value), in
/// first-seen order with dense positions.
pub(crate) fn merge_linked_items(states: &[EntrySnapshot]) -> Vec<LinkedItemSnapshot> {
    let mut seen: HashSet<(i32, &str)> = HashSet::new();
    let mut merged = Vec::new();
    for item in states.iter().flat_map(|state| &state.linked_items) {
        if seen.insert((item.link_type_id, item.value.as_str())) {
            merged.push(LinkedItemSnapshot {
                link_type_id: item.link_type_id,
                value: item.value.clone(),
                position: merged.len() as i32,
            });
        }
    }
    merged
}

/// Sort the entries of one day into display order: explicit positions
/// first, then the rest by id.
pub(crate) fn day_order(models: &mut [entries::Model]) {
    models.sort_by(|a, b| {
        a.sort_order
            .is_none()
            .cmp(&b.sort_order.is_none())
            .then_with(|| a.sort_order.cmp(&b.sort_order))
            .then_with(|| a.id.cmp(&b.id))
    });
}

/// Move `moved` immediately before `before`, or to the end when `before` is
/// absent or not part of `ordered`.
pub(crate) fn splice_order(ordered: &[i32], moved: i32, before: Option<i32>) -> Vec<i32> {
    let mut result: Vec<i32> = ordered.iter().copied().filter(|id| *id != moved).collect();
    match before.and_then(|target| result.iter().position(|id| *id == target)) {
        Some(index) => result.insert(index, moved),
        None => result.push(moved),
    }
    result
}

fn descriptions_overlap(a: &str, b: &str) -> bool {
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    if a.is_empty() || b.is_empty() {
        return false;
    }
    a.contains(&b) || b.contains(&a)
}

pub(crate) fn similarity_score(source: &EntrySnapshot, candidate: &EntrySnapshot) -> u32 {
    let source_pairs: HashSet<(i32, &str)> = source
        .linked_items
        .iter()
        .map(|item| (item.link_type_id, item.value.as_str()))
        .collect();
    let shared_pairs = candidate
        .linked_items
        .iter()
        .map(|item| (item.link_type_id, item.value.as_str()))
        .collect::<HashSet<_>>()
        .intersection(&source_pairs)
        .count() as u32;

    let mut score = shared_pairs * SHARED_PAIR_SCORE;
    if descriptions_overlap(&source.description, &candidate.description) {
        score += DESCRIPTION_MATCH_SCORE;
    }
    if candidate.group_id.is_some() {
        score += GROUPED_SCORE;
    }
    score
}

/// Score and rank candidates for `source`.
///
/// The source itself and members of its group are dropped. Ranking is by
/// score, then most recent date, then highest id.
pub(crate) fn rank_candidates(
    source: &EntrySnapshot,
    candidates: Vec<EntrySnapshot>,
) -> Vec<(EntrySnapshot, u32)> {
    let mut ranked: Vec<(EntrySnapshot, u32)> = candidates
        .into_iter()
        .filter(|candidate| candidate.id != source.id)
        .filter(|candidate| source.group_id.is_none() || candidate.group_id != source.group_id)
        .map(|candidate| {
            let score = similarity_score(source, &candidate);
            (candidate, score)
        })
        .collect();
    ranked.sort_by(|(a, a_score), (b, b_score)| {
        b_score
            .cmp(a_score)
            .then_with(|| b.date.cmp(&a.date))
            .then_with(|| b.id.cmp(&a.id))
    });
    ranked
}

/// Ids whose state an update of `entry` may touch: its whole group when it
/// has one, otherwise just the entry.
pub(crate) async fn group_scope<C: ConnectionTrait>(
    db: &C,
    entry: &entries::Model,
) -> ResultEngine<BTreeSet<i32>> {
    let mut scope = BTreeSet::from([entry.id]);
    if let Some(group_id) = &entry.group_id {
        scope.extend(
            store::group_members(db, group_id)
                .await?
                .into_iter()
                .map(|member| member.id),
        );
    }
    Ok(scope)
}

/// Clear the group id of the last remaining member of `group_id`, if the
/// group has shrunk to one entry. Returns the dissolved member.
pub(crate) async fn dissolve_if_single<C: ConnectionTrait>(
    db: &C,
    group_id: &str,
) -> ResultEngine<Option<i32>> {
    let members = store::group_members(db, group_id).await?;
    let [last] = members.as_slice() else {
        return Ok(None);
    };
    store::update_entry(
        db,
        last.id,
        EntryRowPatch {
            group_id: Some(None),
            ..Default::default()
        },
    )
    .await?;
    tracing::debug!(group_id, entry_id = last.id, "dissolved single-member group");
    Ok(Some(last.id))
}
