//! Entries API endpoints.

use api_types::{
    Ack,
    entry::{
        EntryDuplicate, EntryLink, EntryList, EntryNew, EntryReorder, EntrySuggest, EntryUpdate,
        LinkedItemInput, SplitInput,
    },
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{EntryListFilter, EntryView, Suggestion};

use crate::{ServerError, server::ServerState};

fn map_splits(splits: Vec<SplitInput>) -> Vec<engine::SplitInput> {
    splits
        .into_iter()
        .map(|split| engine::SplitInput {
            account_id: split.account_id,
            duration: split.duration,
        })
        .collect()
}

fn map_linked_items(items: Vec<LinkedItemInput>) -> Vec<engine::LinkedItemInput> {
    items
        .into_iter()
        .map(|item| engine::LinkedItemInput {
            link_type_id: item.link_type_id,
            value: item.value,
        })
        .collect()
}

pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<EntryList>,
) -> Result<Json<Vec<EntryView>>, ServerError> {
    let filter = EntryListFilter {
        from: query.from,
        to: query.to,
    };
    Ok(Json(state.engine.list_entries(&filter).await?))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<Json<EntryView>, ServerError> {
    Ok(Json(state.engine.entry(id).await?))
}

pub async fn entry_new(
    State(state): State<ServerState>,
    Json(payload): Json<EntryNew>,
) -> Result<(StatusCode, Json<EntryView>), ServerError> {
    let (Some(date), Some(duration)) = (payload.date, payload.duration) else {
        return Err(ServerError::Generic(
            "date and duration are required".to_string(),
        ));
    };

    let cmd = engine::EntryNew {
        date,
        duration,
        description: payload.description,
        notes: payload.notes,
        splits: map_splits(payload.splits),
        linked_items: map_linked_items(payload.linked_items),
    };
    let entry = state.engine.create_entry(cmd).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    Json(payload): Json<EntryUpdate>,
) -> Result<Json<EntryView>, ServerError> {
    let patch = engine::EntryPatch {
        date: payload.date,
        duration: payload.duration,
        description: payload.description,
        notes: payload.notes,
        splits: payload.splits.map(map_splits),
        linked_items: payload.linked_items.map(map_linked_items),
    };
    Ok(Json(state.engine.update_entry(id, patch).await?))
}

pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<Json<Ack>, ServerError> {
    state.engine.delete_entry(id).await?;
    Ok(Json(Ack::ok()))
}

pub async fn duplicate(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    Json(payload): Json<EntryDuplicate>,
) -> Result<(StatusCode, Json<EntryView>), ServerError> {
    let Some(date) = payload.date else {
        return Err(ServerError::Generic("date is required".to_string()));
    };
    let entry = state.engine.duplicate_entry(id, date, payload.link).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

pub async fn link(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    Json(payload): Json<EntryLink>,
) -> Result<Json<EntryView>, ServerError> {
    let Some(target_id) = payload.target_entry_id else {
        return Err(ServerError::Generic(
            "target_entry_id is required".to_string(),
        ));
    };
    let entry = state
        .engine
        .link_entries(id, target_id, payload.resolution.as_ref())
        .await?;
    Ok(Json(entry))
}

pub async fn ungroup(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<Json<Ack>, ServerError> {
    state.engine.ungroup_entry(id).await?;
    Ok(Json(Ack::ok()))
}

pub async fn reorder(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    Json(payload): Json<EntryReorder>,
) -> Result<Json<Ack>, ServerError> {
    state.engine.reorder_entry(id, payload.before_id).await?;
    Ok(Json(Ack::ok()))
}

pub async fn suggest_links(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    Query(query): Query<EntrySuggest>,
) -> Result<Json<Vec<Suggestion>>, ServerError> {
    Ok(Json(state.engine.suggest_links(id, query.limit).await?))
}
