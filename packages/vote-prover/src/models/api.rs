use serde::{Deserialize, Serialize};
use vote_circuits::FieldElement;

/// Ledger reply to an accepted vote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteReceipt {
    pub accepted: bool,
    pub nullifier_hash: FieldElement,
    pub vote_hash: FieldElement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TallyCounts {
    pub yes_votes: u64,
    pub no_votes: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NullifierStatus {
    pub nullifier_hash: FieldElement,
    pub spent: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
