use ark_bn254::Bn254;
use ark_groth16::{Groth16, PreparedVerifyingKey, Proof};
use ark_snark::SNARK;
use tracing::warn;

use crate::*;

/// Groth16 pairing check. Any failure, including a key built for a
/// different number of public inputs, is reported as `false`.
pub fn verify(
    proof: &Proof<Bn254>,
    signals: &PublicSignals,
    verifying_key: &PreparedVerifyingKey<Bn254>,
) -> bool {
    let inputs = CircuitFactory::create_verify_inputs(signals);
    if inputs.len() + 1 != verifying_key.vk.gamma_abc_g1.len() {
        warn!(
            expected = verifying_key.vk.gamma_abc_g1.len().saturating_sub(1),
            got = inputs.len(),
            "verifying key arity does not match the vote circuit"
        );
        return false;
    }

    match Groth16::<Bn254>::verify_with_processed_vk(verifying_key, &inputs, proof) {
        Ok(valid) => valid,
        Err(e) => {
            warn!("pairing check failed: {e}");
            false
        }
    }
}

/// Verifies a proof in wire form. Shape problems are errors; everything
/// past the shape check is a plain yes or no.
pub fn verify_wire(
    proof: &ProofJson,
    public_signals: &[String],
    verifying_key: &PreparedVerifyingKey<Bn254>,
) -> Result<bool, CircuitError> {
    let signals = PublicSignals::from_wire(public_signals)?;
    match proof.decode()? {
        Some(proof) => Ok(verify(&proof, &signals, verifying_key)),
        None => Ok(false),
    }
}
