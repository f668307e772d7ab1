use api_types::{
    Ack,
    link_type::{LinkTypeNew, LinkTypeUpdate},
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::LinkType;

use crate::{ServerError, server::ServerState};

pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<LinkType>>, ServerError> {
    Ok(Json(state.engine.list_link_types().await?))
}

pub async fn link_type_new(
    State(state): State<ServerState>,
    Json(payload): Json<LinkTypeNew>,
) -> Result<(StatusCode, Json<LinkType>), ServerError> {
    let link_type = state
        .engine
        .create_link_type(engine::LinkTypeNew {
            title: payload.title,
            url_template: payload.url_template,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(link_type)))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    Json(payload): Json<LinkTypeUpdate>,
) -> Result<Json<LinkType>, ServerError> {
    let patch = engine::LinkTypePatch {
        title: payload.title,
        url_template: payload.url_template,
        position: payload.position,
    };
    Ok(Json(state.engine.update_link_type(id, patch).await?))
}

pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<Json<Ack>, ServerError> {
    state.engine.delete_link_type(id).await?;
    Ok(Json(Ack::ok()))
}
