use ark_bn254::Fr;

use crate::*;

pub struct CircuitFactory;

impl CircuitFactory {
    /// Builds a fully assigned circuit together with the public signals it
    /// commits to.
    pub fn create_circuit(
        secret: &VoteSecret,
    ) -> Result<(AnonymousVotingCircuit, PublicSignals), CircuitError> {
        let public_input = PublicSignals::from(secret.commitment()?);
        let private_input = AnonymousVotingPrivateInput {
            vote: secret.vote.as_bool(),
            nullifier_seed: secret.nullifier_seed,
            secret: secret.secret,
        };

        Ok((
            AnonymousVotingCircuit::combine_inputs(private_input, public_input),
            public_input,
        ))
    }

    pub fn create_blank_circuit() -> AnonymousVotingCircuit {
        AnonymousVotingCircuit::blank()
    }

    pub fn create_verify_inputs(signals: &PublicSignals) -> Vec<Fr> {
        signals.to_inputs()
    }
}
