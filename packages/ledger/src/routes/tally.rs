use axum::{
    extract::{rejection::JsonRejection, State},
    middleware,
    routing::{get, post},
    Json, Router,
};
use tracing::info;

use crate::error::LedgerError;
use crate::models::{Tally, TallyReport, TallyRequest};
use crate::state::AppState;

pub mod auth_middleware;

pub async fn tally_votes(
    State(state): State<AppState>,
    axum::Extension(aggregator): axum::Extension<String>,
    payload: Result<Json<TallyRequest>, JsonRejection>,
) -> Result<Json<TallyReport>, LedgerError> {
    let Json(request) =
        payload.map_err(|rejection| LedgerError::InvalidRequest(rejection.body_text()))?;
    info!(
        %aggregator,
        yes = request.yes_hashes.len(),
        no = request.no_hashes.len(),
        "tally batch received"
    );
    let report = state
        .ledger
        .tally_votes(&request.yes_hashes, &request.no_hashes)
        .await?;
    Ok(Json(report))
}

pub async fn get_tally(State(state): State<AppState>) -> Json<Tally> {
    Json(state.ledger.tally().await)
}

pub async fn yes_votes(State(state): State<AppState>) -> Json<u64> {
    Json(state.ledger.yes_votes().await)
}

pub async fn no_votes(State(state): State<AppState>) -> Json<u64> {
    Json(state.ledger.no_votes().await)
}

pub fn routes(state: AppState) -> Router {
    let submit = post(tally_votes).route_layer(middleware::from_fn_with_state(
        state.clone(),
        auth_middleware::auth_middleware,
    ));

    Router::new()
        .route("/", get(get_tally).merge(submit))
        .route("/yes", get(yes_votes))
        .route("/no", get(no_votes))
        .with_state(state)
}
