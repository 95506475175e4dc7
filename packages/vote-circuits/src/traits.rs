use ark_bn254::Fr;
use ark_relations::r1cs::{ConstraintSynthesizer, ConstraintSystem};

use crate::CircuitError;

pub mod circuits;

pub trait VotingCircuit: ConstraintSynthesizer<Fr> + Clone + Sized {
    type Private;
    type Public;

    fn combine_inputs(private: Self::Private, public: Self::Public) -> Self;

    /// Shape-only instance used for key generation.
    fn blank() -> Self;

    /// Public inputs in the order the circuit allocates them.
    fn public_inputs(&self) -> Result<Vec<Fr>, CircuitError>;

    /// Synthesizes the circuit against a scratch constraint system and
    /// checks the witness satisfies it. The prover does not check this on
    /// its own and would happily emit an unverifiable proof.
    fn validate(&self) -> Result<(), CircuitError> {
        let cs = ConstraintSystem::<Fr>::new_ref();
        self.clone().generate_constraints(cs.clone())?;
        if cs.is_satisfied()? {
            return Ok(());
        }
        let unsatisfied = cs
            .which_is_unsatisfied()?
            .unwrap_or_else(|| "unknown constraint".to_string());
        Err(CircuitError::ProofGeneration(format!(
            "witness does not satisfy the circuit: {unsatisfied}"
        )))
    }
}
