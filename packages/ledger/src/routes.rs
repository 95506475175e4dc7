use crate::state::AppState;
use crate::utils::websocket;
use axum::{routing::get, Router};

mod tally;
mod vote;

async fn health() -> &'static str {
    "ok"
}

fn events_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/events", get(websocket::handler))
        .with_state(state)
}

pub fn create_routes(state: AppState) -> Router {
    Router::new()
        .nest("/api/votes", vote::routes(state.clone()))
        .nest("/api/tally", tally::routes(state.clone()))
        .merge(events_routes(state))
        .route("/health", get(health))
}
