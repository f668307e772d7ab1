use chrono::NaiveDate;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{
    AccountNew, ActionKind, Engine, EntryListFilter, EntryNew, EntryPatch, HistoryStatus,
    RedoOutcome, UndoOutcome,
};
use migration::MigratorTrait;

async fn engine_with_depth(depth: Option<usize>) -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let mut builder = Engine::builder().database(db.clone());
    if let Some(depth) = depth {
        builder = builder.history_depth(depth);
    }
    (builder.build().await.unwrap(), db)
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
}

async fn undo_log_len(db: &DatabaseConnection) -> usize {
    let backend = db.get_database_backend();
    db.query_all(Statement::from_string(backend, "SELECT id FROM undo_log"))
        .await
        .unwrap()
        .len()
}

async fn entry_count(engine: &Engine) -> usize {
    engine
        .list_entries(&EntryListFilter::default())
        .await
        .unwrap()
        .len()
}

#[tokio::test]
async fn empty_history_reports_nothing_to_do() {
    let (engine, _db) = engine_with_depth(None).await;

    assert_eq!(engine.undo().await.unwrap(), UndoOutcome::NothingToUndo);
    assert_eq!(engine.redo().await.unwrap(), RedoOutcome::NothingToRedo);
    assert_eq!(
        engine.history_status().await.unwrap(),
        HistoryStatus::default()
    );
}

#[tokio::test]
async fn undo_and_redo_of_create_restore_the_same_id() {
    let (engine, _db) = engine_with_depth(None).await;

    let entry = engine
        .create_entry(EntryNew::new(day(2), 25).description("Write report"))
        .await
        .unwrap();

    assert_eq!(
        engine.undo().await.unwrap(),
        UndoOutcome::Undone {
            action: ActionKind::CreateEntry
        }
    );
    assert_eq!(entry_count(&engine).await, 0);

    assert_eq!(
        engine.redo().await.unwrap(),
        RedoOutcome::Redone {
            action: ActionKind::CreateEntry
        }
    );
    assert_eq!(engine.entry(entry.id).await.unwrap(), entry);
}

#[tokio::test]
async fn undo_of_delete_restores_children() {
    let (engine, _db) = engine_with_depth(None).await;
    let account = engine
        .create_account(AccountNew::new("100").description("Ops"))
        .await
        .unwrap();

    let entry = engine
        .create_entry(EntryNew::new(day(2), 40).split(account.id, 40))
        .await
        .unwrap();
    engine.delete_entry(entry.id).await.unwrap();
    assert_eq!(entry_count(&engine).await, 0);

    engine.undo().await.unwrap();
    assert_eq!(engine.entry(entry.id).await.unwrap(), entry);

    engine.redo().await.unwrap();
    assert_eq!(entry_count(&engine).await, 0);
}

#[tokio::test]
async fn undo_then_redo_walks_history_in_order() {
    let (engine, _db) = engine_with_depth(None).await;

    let entry = engine.create_entry(EntryNew::new(day(2), 10)).await.unwrap();
    engine
        .update_entry(entry.id, EntryPatch::default().duration(20))
        .await
        .unwrap();
    engine
        .update_entry(entry.id, EntryPatch::default().duration(30))
        .await
        .unwrap();

    engine.undo().await.unwrap();
    engine.undo().await.unwrap();
    assert_eq!(engine.entry(entry.id).await.unwrap().duration, 10);

    let status = engine.history_status().await.unwrap();
    assert_eq!(status.next_undo, Some(ActionKind::CreateEntry));
    assert_eq!(status.next_redo, Some(ActionKind::UpdateEntry));

    engine.redo().await.unwrap();
    assert_eq!(engine.entry(entry.id).await.unwrap().duration, 20);
    engine.redo().await.unwrap();
    assert_eq!(engine.entry(entry.id).await.unwrap().duration, 30);
    assert_eq!(engine.redo().await.unwrap(), RedoOutcome::NothingToRedo);
}

#[tokio::test]
async fn new_action_discards_redo_history() {
    let (engine, db) = engine_with_depth(None).await;

    let entry = engine.create_entry(EntryNew::new(day(2), 10)).await.unwrap();
    engine
        .update_entry(entry.id, EntryPatch::default().duration(20))
        .await
        .unwrap();
    engine.undo().await.unwrap();
    assert!(engine.history_status().await.unwrap().can_redo);

    engine
        .update_entry(entry.id, EntryPatch::default().notes("new branch"))
        .await
        .unwrap();
    let status = engine.history_status().await.unwrap();
    assert!(!status.can_redo);
    assert_eq!(engine.redo().await.unwrap(), RedoOutcome::NothingToRedo);
    assert_eq!(undo_log_len(&db).await, 2);
}

#[tokio::test]
async fn no_op_update_is_not_journaled() {
    let (engine, db) = engine_with_depth(None).await;

    let entry = engine
        .create_entry(EntryNew::new(day(2), 10).notes("same"))
        .await
        .unwrap();
    engine
        .update_entry(entry.id, EntryPatch::default().notes("same"))
        .await
        .unwrap();
    assert_eq!(undo_log_len(&db).await, 1);
}

#[tokio::test]
async fn history_is_bounded_by_depth() {
    let (engine, db) = engine_with_depth(Some(3)).await;

    for d in 1..=5 {
        engine.create_entry(EntryNew::new(day(d), 10)).await.unwrap();
    }
    assert_eq!(undo_log_len(&db).await, 3);

    for _ in 0..3 {
        assert!(matches!(
            engine.undo().await.unwrap(),
            UndoOutcome::Undone { .. }
        ));
    }
    assert_eq!(engine.undo().await.unwrap(), UndoOutcome::NothingToUndo);
    assert_eq!(entry_count(&engine).await, 2);
}

#[tokio::test]
async fn default_depth_keeps_fifty_actions() {
    let (engine, db) = engine_with_depth(None).await;

    for n in 0..(engine::DEFAULT_HISTORY_DEPTH + 5) {
        engine
            .create_entry(EntryNew::new(day(1 + (n % 28) as u32), 1))
            .await
            .unwrap();
    }
    assert_eq!(undo_log_len(&db).await, engine::DEFAULT_HISTORY_DEPTH);
}

#[tokio::test]
async fn undo_of_link_restores_both_sides() {
    let (engine, _db) = engine_with_depth(None).await;

    let a = engine
        .create_entry(EntryNew::new(day(2), 10).description("alpha"))
        .await
        .unwrap();
    let b = engine
        .create_entry(EntryNew::new(day(3), 10).description("beta"))
        .await
        .unwrap();
    engine.link_entries(a.id, b.id, None).await.unwrap();

    engine.undo().await.unwrap();
    assert_eq!(engine.entry(a.id).await.unwrap(), a);
    assert_eq!(engine.entry(b.id).await.unwrap(), b);

    engine.redo().await.unwrap();
    let a = engine.entry(a.id).await.unwrap();
    assert_eq!(a.description, "beta");
    assert_eq!(a.group_id, engine.entry(b.id).await.unwrap().group_id);
}

#[tokio::test]
async fn undo_of_ungroup_restores_group() {
    let (engine, _db) = engine_with_depth(None).await;

    let a = engine.create_entry(EntryNew::new(day(2), 10)).await.unwrap();
    let b = engine.create_entry(EntryNew::new(day(3), 10)).await.unwrap();
    let linked = engine.link_entries(a.id, b.id, None).await.unwrap();
    let a = engine.entry(a.id).await.unwrap();
    let b = engine.entry(b.id).await.unwrap();

    // b is left alone in the group, so it loses its group id as well
    engine.ungroup_entry(a.id).await.unwrap();
    assert_eq!(engine.entry(a.id).await.unwrap().group_id, None);
    assert_eq!(engine.entry(b.id).await.unwrap().group_id, None);

    assert_eq!(
        engine.undo().await.unwrap(),
        UndoOutcome::Undone {
            action: ActionKind::UngroupEntry
        }
    );
    assert_eq!(engine.entry(a.id).await.unwrap(), a);
    assert_eq!(engine.entry(b.id).await.unwrap(), b);
    assert_eq!(b.group_id, linked.group_id);

    engine.redo().await.unwrap();
    assert_eq!(engine.entry(a.id).await.unwrap().group_id, None);
    assert_eq!(engine.entry(b.id).await.unwrap().group_id, None);
}

#[tokio::test]
async fn undo_of_linked_duplicate_clears_minted_group() {
    let (engine, _db) = engine_with_depth(None).await;

    let source = engine
        .create_entry(EntryNew::new(day(2), 10).description("standup"))
        .await
        .unwrap();
    let copy = engine.duplicate_entry(source.id, day(3), true).await.unwrap();
    assert!(copy.group_id.is_some());

    engine.undo().await.unwrap();
    assert_eq!(engine.entry(source.id).await.unwrap(), source);
    assert!(engine.entry(copy.id).await.is_err());
    assert_eq!(entry_count(&engine).await, 1);

    // a source that already has a group is left untouched by the undo
    let mate = engine.create_entry(EntryNew::new(day(4), 10)).await.unwrap();
    engine.link_entries(source.id, mate.id, None).await.unwrap();
    let grouped = engine.entry(source.id).await.unwrap();
    let copy = engine.duplicate_entry(source.id, day(5), true).await.unwrap();
    assert_eq!(copy.group_id, grouped.group_id);

    engine.undo().await.unwrap();
    assert!(engine.entry(copy.id).await.is_err());
    assert_eq!(engine.entry(source.id).await.unwrap(), grouped);
    assert_eq!(
        engine.entry(mate.id).await.unwrap().group_id,
        grouped.group_id
    );
}

#[tokio::test]
async fn catalog_changes_are_not_journaled() {
    let (engine, db) = engine_with_depth(None).await;

    engine.create_account(AccountNew::new("200")).await.unwrap();
    assert_eq!(undo_log_len(&db).await, 0);
    assert_eq!(engine.undo().await.unwrap(), UndoOutcome::NothingToUndo);
}
