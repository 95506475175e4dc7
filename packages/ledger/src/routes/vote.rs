use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::{get, post},
    Json, Router,
};
use vote_circuits::{FieldElement, VoteSubmission};

use crate::error::LedgerError;
use crate::models::{NullifierStatus, VoteReceipt};
use crate::state::AppState;

pub async fn cast_vote(
    State(state): State<AppState>,
    payload: Result<Json<VoteSubmission>, JsonRejection>,
) -> Result<Json<VoteReceipt>, LedgerError> {
    let Json(submission) =
        payload.map_err(|rejection| LedgerError::InvalidProofShape(rejection.body_text()))?;
    let event = state.ledger.cast_vote(&submission).await?;
    Ok(Json(event.into()))
}

pub async fn nullifier_status(
    State(state): State<AppState>,
    Path(nullifier_hash): Path<String>,
) -> Result<Json<NullifierStatus>, LedgerError> {
    let nullifier_hash = FieldElement::from_decimal(&nullifier_hash)
        .map_err(|_| LedgerError::InvalidHash(nullifier_hash))?;
    let spent = state.ledger.is_spent(&nullifier_hash).await;
    Ok(Json(NullifierStatus {
        nullifier_hash,
        spent,
    }))
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/", post(cast_vote))
        .route("/:nullifier_hash", get(nullifier_status))
        .with_state(state)
}
