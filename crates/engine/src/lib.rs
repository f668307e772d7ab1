//! Time-tracking engine.
//!
//! Entries record time spent on a day, split across imputation accounts and
//! annotated with linked items. Entries can be grouped so that related work
//! shares its description and references. Every entry mutation is journaled
//! as a before/after snapshot pair and can be undone and redone.

pub use accounts::Account;
pub use commands::{
    AccountNew, AccountPatch, EntryNew, EntryPatch, LinkTypeNew, LinkTypePatch, LinkedItemInput,
    SplitInput,
};
pub use entries::{EntryView, LinkedItemView, SplitView};
pub use error::EngineError;
pub use grouping::{SharedField, Suggestion};
pub use history::{ActionKind, DEFAULT_HISTORY_DEPTH, HistoryStatus, RedoOutcome, UndoOutcome};
pub use link_types::LinkType;
pub use ops::{Engine, EngineBuilder, EntryListFilter};

mod accounts;
mod commands;
mod entries;
mod error;
mod grouping;
mod history;
mod link_types;
mod linked_items;
mod ops;
mod snapshot;
mod splits;
mod store;
mod undo_log;

type ResultEngine<T> = Result<T, EngineError>;
