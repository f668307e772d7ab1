use std::collections::HashMap;

use chrono::NaiveDate;
use sea_orm::Database;

use engine::{
    ActionKind, Engine, EngineError, EntryListFilter, EntryNew, EntryPatch, LinkTypeNew,
};
use migration::MigratorTrait;

async fn engine_with_db() -> Engine {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    Engine::builder().database(db).build().await.unwrap()
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
}

async fn ticket_type(engine: &Engine) -> i32 {
    engine
        .create_link_type(LinkTypeNew {
            title: "Ticket".to_string(),
            url_template: "https://tracker.local/{value}".to_string(),
        })
        .await
        .unwrap()
        .id
}

async fn day_order(engine: &Engine, date: NaiveDate) -> Vec<i32> {
    engine
        .list_entries(&EntryListFilter {
            from: Some(date),
            to: Some(date),
        })
        .await
        .unwrap()
        .into_iter()
        .map(|entry| entry.id)
        .collect()
}

#[tokio::test]
async fn link_merges_groups_and_linked_items() {
    let engine = engine_with_db().await;
    let ticket = ticket_type(&engine).await;

    let source = engine
        .create_entry(
            EntryNew::new(day(2), 30)
                .description("Investigate outage")
                .linked_item(ticket, "INC-7")
                .linked_item(ticket, "OPS-1"),
        )
        .await
        .unwrap();
    let target = engine
        .create_entry(
            EntryNew::new(day(3), 60)
                .description("Outage follow-up")
                .linked_item(ticket, "OPS-1")
                .linked_item(ticket, "OPS-2"),
        )
        .await
        .unwrap();

    let linked = engine.link_entries(source.id, target.id, None).await.unwrap();
    let group_id = linked.group_id.clone().unwrap();
    assert_eq!(linked.description, "Outage follow-up");

    let target = engine.entry(target.id).await.unwrap();
    assert_eq!(target.group_id, Some(group_id));
    let values: Vec<&str> = linked
        .linked_items
        .iter()
        .map(|item| item.value.as_str())
        .collect();
    assert_eq!(values, vec!["INC-7", "OPS-1", "OPS-2"]);
    assert_eq!(target.linked_items, linked.linked_items);
    assert_eq!(linked.duration, 30);
}

#[tokio::test]
async fn link_applies_explicit_resolution_and_ignores_unknown_keys() {
    let engine = engine_with_db().await;

    let source = engine
        .create_entry(EntryNew::new(day(2), 30).description("left"))
        .await
        .unwrap();
    let target = engine
        .create_entry(EntryNew::new(day(2), 30).description("right"))
        .await
        .unwrap();

    let resolution = HashMap::from([
        ("description".to_string(), "merged".to_string()),
        ("colour".to_string(), "blue".to_string()),
    ]);
    engine
        .link_entries(source.id, target.id, Some(&resolution))
        .await
        .unwrap();

    assert_eq!(engine.entry(source.id).await.unwrap().description, "merged");
    assert_eq!(engine.entry(target.id).await.unwrap().description, "merged");
}

#[tokio::test]
async fn link_without_known_resolution_keys_uses_target_values() {
    let engine = engine_with_db().await;

    let a = engine
        .create_entry(EntryNew::new(day(2), 30).description("alpha"))
        .await
        .unwrap();
    let b = engine
        .create_entry(EntryNew::new(day(2), 30).description("beta"))
        .await
        .unwrap();
    let c = engine
        .create_entry(EntryNew::new(day(3), 30).description("gamma"))
        .await
        .unwrap();

    let empty = HashMap::new();
    let linked = engine.link_entries(a.id, b.id, Some(&empty)).await.unwrap();
    assert_eq!(linked.description, "beta");
    assert_eq!(engine.entry(b.id).await.unwrap().description, "beta");

    let unknown = HashMap::from([("colour".to_string(), "blue".to_string())]);
    engine
        .link_entries(c.id, a.id, Some(&unknown))
        .await
        .unwrap();
    for id in [a.id, b.id, c.id] {
        assert_eq!(engine.entry(id).await.unwrap().description, "beta");
    }
}

#[tokio::test]
async fn link_is_idempotent_and_refuses_self() {
    let engine = engine_with_db().await;

    let a = engine.create_entry(EntryNew::new(day(2), 10)).await.unwrap();
    let b = engine.create_entry(EntryNew::new(day(2), 10)).await.unwrap();

    let first = engine.link_entries(a.id, b.id, None).await.unwrap();
    let second = engine.link_entries(a.id, b.id, None).await.unwrap();
    assert_eq!(first, second);

    // the repeated link changed nothing, so one undo dissolves the group
    engine.undo().await.unwrap();
    assert_eq!(engine.entry(a.id).await.unwrap().group_id, None);
    assert_eq!(engine.entry(b.id).await.unwrap().group_id, None);

    let err = engine.link_entries(a.id, a.id, None).await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));
}

#[tokio::test]
async fn linking_into_existing_group_keeps_its_id() {
    let engine = engine_with_db().await;

    let a = engine.create_entry(EntryNew::new(day(2), 10)).await.unwrap();
    let b = engine.create_entry(EntryNew::new(day(2), 10)).await.unwrap();
    let c = engine.create_entry(EntryNew::new(day(2), 10)).await.unwrap();
    let d = engine.create_entry(EntryNew::new(day(2), 10)).await.unwrap();

    let ab = engine.link_entries(a.id, b.id, None).await.unwrap();
    engine.link_entries(c.id, d.id, None).await.unwrap();
    engine.link_entries(c.id, a.id, None).await.unwrap();

    for id in [a.id, b.id, c.id, d.id] {
        assert_eq!(engine.entry(id).await.unwrap().group_id, ab.group_id);
    }
}

#[tokio::test]
async fn delete_dissolves_group_left_with_one_member() {
    let engine = engine_with_db().await;

    let a = engine.create_entry(EntryNew::new(day(2), 10)).await.unwrap();
    let b = engine.create_entry(EntryNew::new(day(2), 10)).await.unwrap();
    engine.link_entries(a.id, b.id, None).await.unwrap();

    engine.delete_entry(a.id).await.unwrap();
    assert_eq!(engine.entry(b.id).await.unwrap().group_id, None);

    engine.undo().await.unwrap();
    let a = engine.entry(a.id).await.unwrap();
    let b = engine.entry(b.id).await.unwrap();
    assert!(a.group_id.is_some());
    assert_eq!(a.group_id, b.group_id);
}

#[tokio::test]
async fn ungroup_keeps_larger_groups_and_ignores_ungrouped_entries() {
    let engine = engine_with_db().await;

    let a = engine.create_entry(EntryNew::new(day(2), 10)).await.unwrap();
    let b = engine.create_entry(EntryNew::new(day(2), 10)).await.unwrap();
    let c = engine.create_entry(EntryNew::new(day(2), 10)).await.unwrap();
    engine.link_entries(a.id, b.id, None).await.unwrap();
    engine.link_entries(c.id, b.id, None).await.unwrap();

    engine.ungroup_entry(a.id).await.unwrap();
    let group_id = engine.entry(b.id).await.unwrap().group_id;
    assert!(group_id.is_some());
    assert_eq!(engine.entry(a.id).await.unwrap().group_id, None);
    assert_eq!(engine.entry(c.id).await.unwrap().group_id, group_id);

    engine.ungroup_entry(c.id).await.unwrap();
    assert_eq!(engine.entry(b.id).await.unwrap().group_id, None);

    let status = engine.history_status().await.unwrap();
    engine.ungroup_entry(a.id).await.unwrap();
    assert_eq!(engine.history_status().await.unwrap(), status);
    assert_eq!(status.next_undo, Some(ActionKind::UngroupEntry));
}

#[tokio::test]
async fn shared_description_propagates_to_group() {
    let engine = engine_with_db().await;

    let a = engine
        .create_entry(EntryNew::new(day(2), 10).notes("mine"))
        .await
        .unwrap();
    let b = engine
        .create_entry(EntryNew::new(day(3), 20).notes("theirs"))
        .await
        .unwrap();
    let lone = engine.create_entry(EntryNew::new(day(3), 20)).await.unwrap();
    engine.link_entries(a.id, b.id, None).await.unwrap();

    engine
        .update_entry(
            a.id,
            EntryPatch::default().description("Release 2.0").notes("changed"),
        )
        .await
        .unwrap();

    let b = engine.entry(b.id).await.unwrap();
    assert_eq!(b.description, "Release 2.0");
    assert_eq!(b.notes, "theirs");
    assert_eq!(b.duration, 20);
    assert_eq!(engine.entry(lone.id).await.unwrap().description, "");

    engine.undo().await.unwrap();
    assert_eq!(engine.entry(b.id).await.unwrap().description, "");
    assert_eq!(engine.entry(a.id).await.unwrap().notes, "mine");
}

#[tokio::test]
async fn reorder_moves_entry_within_day() {
    let engine = engine_with_db().await;

    let a = engine.create_entry(EntryNew::new(day(4), 10)).await.unwrap();
    let b = engine.create_entry(EntryNew::new(day(4), 10)).await.unwrap();
    let c = engine.create_entry(EntryNew::new(day(4), 10)).await.unwrap();
    let other = engine.create_entry(EntryNew::new(day(5), 10)).await.unwrap();

    engine.reorder_entry(c.id, Some(a.id)).await.unwrap();
    assert_eq!(day_order(&engine, day(4)).await, vec![c.id, a.id, b.id]);
    let positions: Vec<Option<i32>> = engine
        .list_entries(&EntryListFilter {
            from: Some(day(4)),
            to: Some(day(4)),
        })
        .await
        .unwrap()
        .into_iter()
        .map(|entry| entry.sort_order)
        .collect();
    assert_eq!(positions, vec![Some(0), Some(1), Some(2)]);

    engine.reorder_entry(c.id, None).await.unwrap();
    assert_eq!(day_order(&engine, day(4)).await, vec![a.id, b.id, c.id]);
    assert_eq!(engine.entry(other.id).await.unwrap().sort_order, None);

    engine.undo().await.unwrap();
    assert_eq!(day_order(&engine, day(4)).await, vec![c.id, a.id, b.id]);
    engine.undo().await.unwrap();
    assert_eq!(day_order(&engine, day(4)).await, vec![a.id, b.id, c.id]);
}

#[tokio::test]
async fn reorder_before_itself_changes_nothing() {
    let engine = engine_with_db().await;

    let a = engine.create_entry(EntryNew::new(day(4), 10)).await.unwrap();
    let status = engine.history_status().await.unwrap();

    engine.reorder_entry(a.id, Some(a.id)).await.unwrap();
    assert_eq!(engine.entry(a.id).await.unwrap().sort_order, None);
    assert_eq!(engine.history_status().await.unwrap(), status);

    let err = engine.reorder_entry(a.id + 1, None).await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));

    let missing = a.id + 1;
    let err = engine
        .reorder_entry(missing, Some(missing))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound(format!("entry {missing}")));
}

#[tokio::test]
async fn suggestions_rank_by_shared_items_description_and_grouping() {
    let engine = engine_with_db().await;
    let ticket = ticket_type(&engine).await;

    let source = engine
        .create_entry(
            EntryNew::new(day(10), 30)
                .description("Fix login")
                .linked_item(ticket, "AUTH-1"),
        )
        .await
        .unwrap();
    let sharing = engine
        .create_entry(
            EntryNew::new(day(1), 30)
                .description("Review")
                .linked_item(ticket, "AUTH-1"),
        )
        .await
        .unwrap();
    let wording = engine
        .create_entry(EntryNew::new(day(2), 30).description("LOGIN"))
        .await
        .unwrap();
    let partial = engine
        .create_entry(EntryNew::new(day(3), 30).description("login page"))
        .await
        .unwrap();
    let lunch = engine
        .create_entry(EntryNew::new(day(4), 30).description("Lunch"))
        .await
        .unwrap();

    let ranked: Vec<(i32, u32)> = engine
        .suggest_links(source.id, None)
        .await
        .unwrap()
        .into_iter()
        .map(|suggestion| (suggestion.entry.id, suggestion.score))
        .collect();
    assert_eq!(
        ranked,
        vec![
            (sharing.id, 10),
            (wording.id, 3),
            (lunch.id, 0),
            (partial.id, 0)
        ]
    );
}

#[tokio::test]
async fn suggestions_skip_own_group_and_honour_limit() {
    let engine = engine_with_db().await;

    let source = engine
        .create_entry(EntryNew::new(day(1), 30).description("deploy"))
        .await
        .unwrap();
    let mate = engine
        .create_entry(EntryNew::new(day(1), 30).description("deploy"))
        .await
        .unwrap();
    engine.link_entries(mate.id, source.id, None).await.unwrap();
    for d in 2..=13 {
        engine
            .create_entry(EntryNew::new(day(d), 30).description("deploy prod"))
            .await
            .unwrap();
    }
    let lunch = engine
        .create_entry(EntryNew::new(day(14), 30).description("lunch"))
        .await
        .unwrap();

    let suggestions = engine.suggest_links(source.id, None).await.unwrap();
    assert_eq!(suggestions.len(), 13);
    assert!(suggestions.iter().all(|s| s.entry.id != mate.id));
    assert!(suggestions[..12].iter().all(|s| s.score == 3));
    assert_eq!(suggestions[0].entry.date, day(13));
    assert_eq!(suggestions[12].entry.id, lunch.id);
    assert_eq!(suggestions[12].score, 0);

    let top = engine.suggest_links(source.id, Some(2)).await.unwrap();
    assert_eq!(top, suggestions[..2].to_vec());

    let err = engine.suggest_links(999, None).await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}
