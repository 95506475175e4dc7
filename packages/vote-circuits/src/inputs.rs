use ark_bn254::Fr;
use ark_ff::{UniformRand, Zero};
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};

use crate::{CircuitError, FieldElement};

/// The binary choice being voted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum VoteValue {
    No = 0,
    Yes = 1,
}

impl VoteValue {
    pub fn as_bool(self) -> bool {
        matches!(self, VoteValue::Yes)
    }

    pub fn to_field(self) -> Fr {
        Fr::from(self as u64)
    }
}

impl TryFrom<u8> for VoteValue {
    type Error = CircuitError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(VoteValue::No),
            1 => Ok(VoteValue::Yes),
            other => Err(CircuitError::MalformedInput(format!(
                "vote must be 0 or 1, got {other}"
            ))),
        }
    }
}

impl From<VoteValue> for u8 {
    fn from(value: VoteValue) -> Self {
        value as u8
    }
}

impl From<bool> for VoteValue {
    fn from(value: bool) -> Self {
        if value {
            VoteValue::Yes
        } else {
            VoteValue::No
        }
    }
}

/// Private input for one vote attempt. Lives only inside the proving call
/// and is wiped when dropped.
pub struct VoteSecret {
    pub vote: VoteValue,
    pub nullifier_seed: Fr,
    pub secret: Fr,
}

impl VoteSecret {
    pub fn new(vote: VoteValue, nullifier_seed: Fr, secret: Fr) -> Self {
        Self {
            vote,
            nullifier_seed,
            secret,
        }
    }

    /// Builds a secret from the textual form clients send: a raw vote
    /// number plus two field-element strings.
    pub fn parse(vote: u8, nullifier_seed: &str, secret: &str) -> Result<Self, CircuitError> {
        let vote = VoteValue::try_from(vote)?;
        let nullifier_seed = FieldElement::from_user_input(nullifier_seed)?.inner();
        let secret = FieldElement::from_user_input(secret)?.inner();
        Ok(Self::new(vote, nullifier_seed, secret))
    }

    /// Fresh random seed and secret. Every attempt, including a retry after
    /// a failed proof, must use a new pair.
    pub fn random<R: RngCore + CryptoRng>(vote: VoteValue, rng: &mut R) -> Self {
        Self::new(vote, Fr::rand(rng), Fr::rand(rng))
    }
}

impl Drop for VoteSecret {
    fn drop(&mut self) {
        self.nullifier_seed.set_zero();
        self.secret.set_zero();
    }
}

impl std::fmt::Debug for VoteSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VoteSecret").finish_non_exhaustive()
    }
}
