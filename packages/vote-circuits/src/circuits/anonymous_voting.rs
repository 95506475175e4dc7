use ark_bn254::Fr;
use ark_ff::Zero;

use crate::PublicSignals;

/// Witness side of the vote circuit.
#[derive(Clone)]
pub struct AnonymousVotingPrivateInput {
    pub vote: bool,
    pub nullifier_seed: Fr,
    pub secret: Fr,
}

impl Drop for AnonymousVotingPrivateInput {
    fn drop(&mut self) {
        self.nullifier_seed.set_zero();
        self.secret.set_zero();
    }
}

/// Proves knowledge of `(vote, nullifier_seed, secret)` such that
/// `nullifier_hash = H(nullifier_seed, secret)`, `vote_hash = H(vote, secret)`
/// and `vote ∈ {0, 1}`.
///
/// Public inputs are allocated in wire order: nullifier hash, then vote hash.
/// With both inputs left as `None` the circuit only describes its shape,
/// which is what key generation needs.
#[derive(Clone, Default)]
pub struct AnonymousVotingCircuit {
    pub private_input: Option<AnonymousVotingPrivateInput>,
    pub public_input: Option<PublicSignals>,
}
