use ark_bn254::Bn254;
use ark_groth16::{Groth16, Proof, ProvingKey};
use ark_snark::SNARK;
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use tracing::debug;

use crate::*;

/// Proves knowledge of `secret` against `proving_key`.
///
/// The witness is checked first: Groth16 proving does not notice an
/// unsatisfied constraint and the resulting proof would never verify.
pub fn prove<R: RngCore + CryptoRng>(
    secret: &VoteSecret,
    proving_key: &ProvingKey<Bn254>,
    rng: &mut R,
) -> Result<(Proof<Bn254>, PublicSignals), CircuitError> {
    let (circuit, signals) = CircuitFactory::create_circuit(secret)?;
    circuit.validate()?;

    let proof = Groth16::<Bn254>::prove(proving_key, circuit, rng)?;
    debug!(nullifier_hash = %signals.nullifier_hash, "vote proof generated");

    Ok((proof, signals))
}

/// Parses the three voter inputs and proves them, producing the wire form
/// the ledger accepts.
pub fn generate(
    vote: u8,
    nullifier_seed: &str,
    secret: &str,
    artifacts: &CircuitArtifacts,
) -> Result<ProofBundle, CircuitError> {
    let secret = VoteSecret::parse(vote, nullifier_seed, secret)?;
    let (proof, signals) = prove(&secret, &artifacts.proving_key, &mut OsRng)?;
    Ok(ProofBundle::new(&proof, &signals))
}
