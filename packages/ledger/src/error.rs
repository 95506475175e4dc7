use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use vote_circuits::CircuitError;

/// Reasons a ledger operation is refused. None of them leaves the spent set
/// or the counters partly updated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Invalid proof shape: {0}")]
    InvalidProofShape(String),
    #[error("Invalid proof")]
    InvalidProof,
    #[error("Vote already cast")]
    DoubleVote,
    #[error("Invalid nullifier hash: {0}")]
    InvalidHash(String),
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Ledger storage failed: {0}")]
    Storage(String),
    #[error("Verification worker failed: {0}")]
    Worker(String),
}

impl From<CircuitError> for LedgerError {
    fn from(e: CircuitError) -> Self {
        match e {
            CircuitError::InvalidProofShape(msg) => LedgerError::InvalidProofShape(msg),
            other => LedgerError::InvalidProofShape(other.to_string()),
        }
    }
}

impl LedgerError {
    pub fn status(&self) -> StatusCode {
        match self {
            LedgerError::InvalidProofShape(_) => StatusCode::UNPROCESSABLE_ENTITY,
            LedgerError::InvalidProof
            | LedgerError::InvalidHash(_)
            | LedgerError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            LedgerError::DoubleVote => StatusCode::CONFLICT,
            LedgerError::Storage(_) | LedgerError::Worker(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for LedgerError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}
