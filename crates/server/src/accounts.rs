//! Imputation accounts API endpoints.

use api_types::{
    Ack,
    account::{AccountList, AccountNew, AccountUpdate},
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::Account;

use crate::{ServerError, server::ServerState};

pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<AccountList>,
) -> Result<Json<Vec<Account>>, ServerError> {
    Ok(Json(state.engine.list_accounts(query.include_inactive).await?))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<Json<Account>, ServerError> {
    Ok(Json(state.engine.account(id).await?))
}

pub async fn account_new(
    State(state): State<ServerState>,
    Json(payload): Json<AccountNew>,
) -> Result<(StatusCode, Json<Account>), ServerError> {
    let Some(number) = payload.number else {
        return Err(ServerError::Generic("number is required".to_string()));
    };

    let cmd = engine::AccountNew {
        number,
        description: payload.description,
        project: payload.project,
        opened_on: payload.opened_on,
        closed_on: payload.closed_on,
    };
    let account = state.engine.create_account(cmd).await?;
    Ok((StatusCode::CREATED, Json(account)))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    Json(payload): Json<AccountUpdate>,
) -> Result<Json<Account>, ServerError> {
    let patch = engine::AccountPatch {
        number: payload.number,
        description: payload.description,
        project: payload.project,
        opened_on: payload.opened_on,
        closed_on: payload.closed_on,
        active: payload.active,
    };
    Ok(Json(state.engine.update_account(id, patch).await?))
}

pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<Json<Ack>, ServerError> {
    state.engine.delete_account(id).await?;
    Ok(Json(Ack::ok()))
}
