use serde::{Deserialize, Serialize};
use vote_circuits::FieldElement;

use super::vote::Tally;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TallyRequest {
    #[serde(default)]
    pub yes_hashes: Vec<FieldElement>,
    #[serde(default)]
    pub no_hashes: Vec<FieldElement>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MismatchReason {
    /// The vote hash was offered as both yes and no.
    InBothSets,
    /// A spent vote hash appeared in neither set.
    NotPartitioned,
}

/// A spent record the partition could not classify. It stays untallied so
/// a later, corrected batch can still count it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TallyMismatch {
    pub nullifier_hash: FieldElement,
    pub vote_hash: FieldElement,
    pub reason: MismatchReason,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TallyReport {
    pub yes_counted: u64,
    pub no_counted: u64,
    pub mismatches: Vec<TallyMismatch>,
    /// Submitted hashes that belong to no spent nullifier.
    pub unmatched: Vec<FieldElement>,
    pub tally: Tally,
}
