use serde::{Deserialize, Serialize};
use vote_circuits::{FieldElement, PublicSignals};

/// A spent nullifier and the vote hash it was cast with. Records are only
/// ever appended; `tallied` flips to true once and stays there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NullifierRecord {
    pub nullifier_hash: FieldElement,
    pub vote_hash: FieldElement,
    pub tallied: bool,
}

impl NullifierRecord {
    pub fn spent(signals: &PublicSignals) -> Self {
        Self {
            nullifier_hash: signals.nullifier_hash,
            vote_hash: signals.vote_hash,
            tallied: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tally {
    pub yes_votes: u64,
    pub no_votes: u64,
}

/// Emitted once per accepted vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteCast {
    pub nullifier_hash: FieldElement,
    pub vote_hash: FieldElement,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "messageType")]
pub enum LedgerEvent {
    VoteCast(VoteCast),
    TallyUpdated(Tally),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteReceipt {
    pub accepted: bool,
    pub nullifier_hash: FieldElement,
    pub vote_hash: FieldElement,
}

impl From<VoteCast> for VoteReceipt {
    fn from(event: VoteCast) -> Self {
        Self {
            accepted: true,
            nullifier_hash: event.nullifier_hash,
            vote_hash: event.vote_hash,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NullifierStatus {
    pub nullifier_hash: FieldElement,
    pub spent: bool,
}
