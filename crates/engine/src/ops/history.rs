use crate::{HistoryStatus, RedoOutcome, ResultEngine, UndoOutcome};

use super::{Engine, with_tx};

impl Engine {
    /// Revert the most recent journaled action.
    ///
    /// An empty history is reported as [`UndoOutcome::NothingToUndo`], not as
    /// an error.
    pub async fn undo(&self) -> ResultEngine<UndoOutcome> {
        with_tx!(self, |db_tx| self.ledger.undo(&db_tx).await)
    }

    /// Replay the oldest undone action.
    pub async fn redo(&self) -> ResultEngine<RedoOutcome> {
        with_tx!(self, |db_tx| self.ledger.redo(&db_tx).await)
    }

    pub async fn history_status(&self) -> ResultEngine<HistoryStatus> {
        with_tx!(self, |db_tx| self.ledger.status(&db_tx).await)
    }
}
