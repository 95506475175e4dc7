use ark_bn254::Fr;
use ark_crypto_primitives::crh::poseidon::constraints::CRHParametersVar;
use ark_r1cs_std::{alloc::AllocVar, boolean::Boolean, eq::EqGadget, fields::fp::FpVar};
use ark_relations::ns;
use ark_relations::r1cs::{ConstraintSynthesizer, ConstraintSystemRef, SynthesisError};

use crate::hash::{hash_two_var, poseidon_config};
use crate::*;

impl VotingCircuit for AnonymousVotingCircuit {
    type Private = AnonymousVotingPrivateInput;
    type Public = PublicSignals;

    fn combine_inputs(private: Self::Private, public: Self::Public) -> Self {
        AnonymousVotingCircuit {
            private_input: Some(private),
            public_input: Some(public),
        }
    }

    fn blank() -> Self {
        AnonymousVotingCircuit::default()
    }

    fn public_inputs(&self) -> Result<Vec<Fr>, CircuitError> {
        self.public_input
            .map(|public| public.to_inputs())
            .ok_or_else(|| CircuitError::MalformedInput("circuit has no public input".to_string()))
    }
}

impl ConstraintSynthesizer<Fr> for AnonymousVotingCircuit {
    fn generate_constraints(self, cs: ConstraintSystemRef<Fr>) -> Result<(), SynthesisError> {
        let params = CRHParametersVar::new_constant(cs.clone(), poseidon_config())?;

        let public = self.public_input;
        let nullifier_hash = FpVar::new_input(ns!(cs, "nullifier_hash"), || {
            public
                .map(|p| p.nullifier_hash.inner())
                .ok_or(SynthesisError::AssignmentMissing)
        })?;
        let vote_hash = FpVar::new_input(ns!(cs, "vote_hash"), || {
            public
                .map(|p| p.vote_hash.inner())
                .ok_or(SynthesisError::AssignmentMissing)
        })?;

        let private = self.private_input.as_ref();
        // Boolean allocation enforces vote * (vote - 1) = 0.
        let vote = Boolean::new_witness(ns!(cs, "vote"), || {
            private.map(|p| p.vote).ok_or(SynthesisError::AssignmentMissing)
        })?;
        let nullifier_seed = FpVar::new_witness(ns!(cs, "nullifier_seed"), || {
            private
                .map(|p| p.nullifier_seed)
                .ok_or(SynthesisError::AssignmentMissing)
        })?;
        let secret = FpVar::new_witness(ns!(cs, "secret"), || {
            private
                .map(|p| p.secret)
                .ok_or(SynthesisError::AssignmentMissing)
        })?;

        let vote: FpVar<Fr> = vote.into();

        hash_two_var(&params, &nullifier_seed, &secret)?.enforce_equal(&nullifier_hash)?;
        hash_two_var(&params, &vote, &secret)?.enforce_equal(&vote_hash)?;

        Ok(())
    }
}
