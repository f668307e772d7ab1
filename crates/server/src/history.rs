//! Undo/redo API endpoints.
//!
//! An empty stack is not an error: the outcome is returned with status 200 and
//! a `nothing_to_undo` / `nothing_to_redo` status tag.

use axum::{Json, extract::State};
use engine::{HistoryStatus, RedoOutcome, UndoOutcome};

use crate::{ServerError, server::ServerState};

pub async fn undo(State(state): State<ServerState>) -> Result<Json<UndoOutcome>, ServerError> {
    Ok(Json(state.engine.undo().await?))
}

pub async fn redo(State(state): State<ServerState>) -> Result<Json<RedoOutcome>, ServerError> {
    Ok(Json(state.engine.redo().await?))
}

pub async fn status(State(state): State<ServerState>) -> Result<Json<HistoryStatus>, ServerError> {
    Ok(Json(state.engine.history_status().await?))
}
