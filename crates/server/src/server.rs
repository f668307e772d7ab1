use axum::{
    Router,
    routing::{get, post},
};

use std::sync::Arc;

use crate::{accounts, entries, history, link_types};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

/// Build the `/api` router over `engine`.
pub fn router(engine: Engine) -> Router {
    let state = ServerState {
        engine: Arc::new(engine),
    };

    Router::new()
        .route("/api/entries", get(entries::list).post(entries::entry_new))
        .route("/api/entries/{id}", get(entries::get).post(entries::update))
        .route("/api/entries/{id}/delete", post(entries::delete))
        .route("/api/entries/{id}/duplicate", post(entries::duplicate))
        .route("/api/entries/{id}/link", post(entries::link))
        .route("/api/entries/{id}/ungroup", post(entries::ungroup))
        .route("/api/entries/{id}/reorder", post(entries::reorder))
        .route("/api/entries/{id}/suggest-links", get(entries::suggest_links))
        .route(
            "/api/accounts",
            get(accounts::list).post(accounts::account_new),
        )
        .route("/api/accounts/{id}", get(accounts::get).post(accounts::update))
        .route("/api/accounts/{id}/delete", post(accounts::delete))
        .route(
            "/api/link-types",
            get(link_types::list).post(link_types::link_type_new),
        )
        .route("/api/link-types/{id}", post(link_types::update))
        .route("/api/link-types/{id}/delete", post(link_types::delete))
        .route("/api/undo", post(history::undo))
        .route("/api/redo", post(history::redo))
        .route("/api/history", get(history::status))
        .with_state(state)
}

pub async fn run_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(engine)).await
}
