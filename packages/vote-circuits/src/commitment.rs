use ark_bn254::Fr;
use serde::{Deserialize, Serialize};

use crate::hash::hash_two;
use crate::{CircuitError, FieldElement, VoteSecret, VoteValue};

/// The two public hashes bound to a vote attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Commitment {
    pub nullifier_hash: FieldElement,
    pub vote_hash: FieldElement,
}

/// `nullifier_hash = H(nullifier_seed, secret)`, `vote_hash = H(vote, secret)`.
///
/// The nullifier hash never sees the vote, so it cannot leak the choice.
pub fn derive(secret: Fr, nullifier_seed: Fr, vote: VoteValue) -> Result<Commitment, CircuitError> {
    Ok(Commitment {
        nullifier_hash: hash_two(nullifier_seed, secret)?.into(),
        vote_hash: hash_two(vote.to_field(), secret)?.into(),
    })
}

impl VoteSecret {
    pub fn commitment(&self) -> Result<Commitment, CircuitError> {
        derive(self.secret, self.nullifier_seed, self.vote)
    }
}
