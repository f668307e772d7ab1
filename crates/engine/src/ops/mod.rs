use std::collections::BTreeSet;

use sea_orm::{ConnectionTrait, DatabaseConnection, QueryFilter, prelude::*};

use crate::{
    EngineError, LinkedItemInput, ResultEngine, SplitInput,
    history::{ActionKind, DEFAULT_HISTORY_DEPTH, Ledger},
    snapshot::{self, EntrySnapshot, LinkedItemSnapshot, SplitSnapshot},
};

mod accounts;
mod entries;
mod grouping;
mod history;
mod link_types;

pub use entries::EntryListFilter;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = sea_orm::TransactionTrait::begin(&$self.database).await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

/// Entry point of every read and write.
///
/// Each public method runs in its own transaction. Mutations of entries are
/// journaled in the undo ledger owned by the engine.
#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    ledger: Ledger,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Capture the after-state of `scope` and journal it against `before`.
    async fn journal<C: ConnectionTrait>(
        &self,
        db: &C,
        action: ActionKind,
        before: &[EntrySnapshot],
        scope: &BTreeSet<i32>,
    ) -> ResultEngine<()> {
        let after = snapshot::capture(db, scope).await?;
        if !self.ledger.record(db, action, before, &after).await? {
            tracing::debug!(action = action.as_str(), "no-op mutation, nothing journaled");
        }
        Ok(())
    }
}

fn validate_duration(duration: i32, label: &str) -> ResultEngine<()> {
    if duration < 0 {
        return Err(EngineError::InvalidInput(format!(
            "{label} duration must be >= 0"
        )));
    }
    Ok(())
}

fn normalize_required_text(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidInput(format!(
            "{label} must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}

/// Check split accounts exist and are active, and give splits dense positions.
async fn resolve_splits<C: ConnectionTrait>(
    db: &C,
    splits: &[SplitInput],
) -> ResultEngine<Vec<SplitSnapshot>> {
    let ids: BTreeSet<i32> = splits.iter().map(|split| split.account_id).collect();
    if !ids.is_empty() {
        let active: BTreeSet<i32> = crate::accounts::Entity::find()
            .filter(crate::accounts::Column::Id.is_in(ids.iter().copied()))
            .filter(crate::accounts::Column::Active.eq(true))
            .all(db)
            .await?
            .into_iter()
            .map(|account| account.id)
            .collect();
        if let Some(missing) = ids.difference(&active).next() {
            return Err(EngineError::KeyNotFound(format!("account {missing}")));
        }
    }

    splits
        .iter()
        .enumerate()
        .map(|(position, split)| {
            validate_duration(split.duration, "split")?;
            Ok(SplitSnapshot {
                account_id: split.account_id,
                duration: split.duration,
                position: position as i32,
            })
        })
        .collect()
}

/// Check link types exist, drop blank values and give items dense positions.
async fn resolve_linked_items<C: ConnectionTrait>(
    db: &C,
    items: &[LinkedItemInput],
) -> ResultEngine<Vec<LinkedItemSnapshot>> {
    let ids: BTreeSet<i32> = items.iter().map(|item| item.link_type_id).collect();
    if !ids.is_empty() {
        let known: BTreeSet<i32> = crate::link_types::Entity::find()
            .filter(crate::link_types::Column::Id.is_in(ids.iter().copied()))
            .all(db)
            .await?
            .into_iter()
            .map(|link_type| link_type.id)
            .collect();
        if let Some(missing) = ids.difference(&known).next() {
            return Err(EngineError::KeyNotFound(format!("link type {missing}")));
        }
    }

    Ok(items
        .iter()
        .map(|item| (item.link_type_id, item.value.trim()))
        .filter(|(_, value)| !value.is_empty())
        .enumerate()
        .map(|(position, (link_type_id, value))| LinkedItemSnapshot {
            link_type_id,
            value: value.to_string(),
            position: position as i32,
        })
        .collect())
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    history_depth: Option<usize>,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Number of undoable actions kept (default 50).
    pub fn history_depth(mut self, depth: usize) -> EngineBuilder {
        self.history_depth = Some(depth);
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
            ledger: Ledger::new(self.history_depth.unwrap_or(DEFAULT_HISTORY_DEPTH)),
        })
    }
}
