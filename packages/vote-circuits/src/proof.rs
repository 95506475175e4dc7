//! Proof and public-signal wire formats.
//!
//! Coordinates travel as decimal strings in the layout snarkjs emits, so
//! proofs produced here can be checked by an external Groth16 verifier and
//! the other way around.

use ark_bn254::{Bn254, Fq, Fq2, Fr, G1Affine, G2Affine};
use ark_groth16::Proof;
use serde::{Deserialize, Serialize};

use crate::field::{parse_decimal, to_decimal};
use crate::{CircuitError, Commitment, FieldElement};

pub const PUBLIC_SIGNAL_COUNT: usize = 2;

/// Public inputs of the vote circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicSignals {
    pub nullifier_hash: FieldElement,
    pub vote_hash: FieldElement,
}

impl PublicSignals {
    /// Inputs in the order the circuit allocates them.
    pub fn to_inputs(&self) -> Vec<Fr> {
        vec![self.nullifier_hash.inner(), self.vote_hash.inner()]
    }

    pub fn to_wire(&self) -> Vec<String> {
        vec![self.nullifier_hash.to_decimal(), self.vote_hash.to_decimal()]
    }

    pub fn from_wire(signals: &[String]) -> Result<Self, CircuitError> {
        if signals.len() != PUBLIC_SIGNAL_COUNT {
            return Err(CircuitError::InvalidProofShape(format!(
                "expected {PUBLIC_SIGNAL_COUNT} public signals, got {}",
                signals.len()
            )));
        }
        let parse = |s: &String| {
            FieldElement::from_decimal(s).map_err(|_| {
                CircuitError::InvalidProofShape(format!("public signal is not a field element: {s:?}"))
            })
        };
        Ok(Self {
            nullifier_hash: parse(&signals[0])?,
            vote_hash: parse(&signals[1])?,
        })
    }
}

impl From<Commitment> for PublicSignals {
    fn from(commitment: Commitment) -> Self {
        Self {
            nullifier_hash: commitment.nullifier_hash,
            vote_hash: commitment.vote_hash,
        }
    }
}

/// Groth16 proof in snarkjs JSON layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofJson {
    #[serde(rename = "piA", alias = "pi_a")]
    pub pi_a: Vec<String>,
    #[serde(rename = "piB", alias = "pi_b")]
    pub pi_b: Vec<Vec<String>>,
    #[serde(rename = "piC", alias = "pi_c")]
    pub pi_c: Vec<String>,
}

impl ProofJson {
    pub fn from_proof(proof: &Proof<Bn254>) -> Self {
        Self {
            pi_a: encode_g1(&proof.a),
            pi_b: encode_g2(&proof.b),
            pi_c: encode_g1(&proof.c),
        }
    }

    /// Checks the array shape and that every coordinate is a decimal string.
    pub fn check_shape(&self) -> Result<(), CircuitError> {
        check_g1_shape("piA", &self.pi_a)?;
        check_g2_shape("piB", &self.pi_b)?;
        check_g1_shape("piC", &self.pi_c)?;
        Ok(())
    }

    /// Decodes into curve points.
    ///
    /// A wrong shape is an error. A well-formed proof whose coordinates do
    /// not describe valid subgroup points decodes to `None`, which callers
    /// treat as a failed verification.
    pub fn decode(&self) -> Result<Option<Proof<Bn254>>, CircuitError> {
        self.check_shape()?;

        let (Some(a), Some(b), Some(c)) = (
            decode_g1(&self.pi_a),
            decode_g2(&self.pi_b),
            decode_g1(&self.pi_c),
        ) else {
            return Ok(None);
        };

        Ok(Some(Proof { a, b, c }))
    }
}

/// What the prover hands back to a voter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofBundle {
    pub proof: ProofJson,
    pub public_signals: Vec<String>,
}

impl ProofBundle {
    pub fn new(proof: &Proof<Bn254>, signals: &PublicSignals) -> Self {
        Self {
            proof: ProofJson::from_proof(proof),
            public_signals: signals.to_wire(),
        }
    }
}

/// Body of a ledger cast request: the proof coordinates flattened next to
/// the public signals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteSubmission {
    #[serde(flatten)]
    pub proof: ProofJson,
    pub public_signals: Vec<String>,
}

impl VoteSubmission {
    /// Shape checks for both halves, before any curve arithmetic.
    pub fn signals(&self) -> Result<PublicSignals, CircuitError> {
        self.proof.check_shape()?;
        PublicSignals::from_wire(&self.public_signals)
    }
}

impl From<ProofBundle> for VoteSubmission {
    fn from(bundle: ProofBundle) -> Self {
        Self {
            proof: bundle.proof,
            public_signals: bundle.public_signals,
        }
    }
}

fn shape_error(name: &str, detail: impl std::fmt::Display) -> CircuitError {
    CircuitError::InvalidProofShape(format!("{name}: {detail}"))
}

fn check_decimal(name: &str, value: &str) -> Result<(), CircuitError> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(shape_error(name, format!("not a decimal string: {value:?}")));
    }
    Ok(())
}

// snarkjs appends the projective z coordinate, "1" for G1 and ["1", "0"]
// for G2. It carries no information for affine points and is dropped.
fn check_g1_shape(name: &str, coords: &[String]) -> Result<(), CircuitError> {
    match coords {
        [x, y] => {
            check_decimal(name, x)?;
            check_decimal(name, y)
        }
        [x, y, z] if z == "1" => {
            check_decimal(name, x)?;
            check_decimal(name, y)
        }
        _ => Err(shape_error(name, format!("expected 2 coordinates, got {}", coords.len()))),
    }
}

fn check_g2_shape(name: &str, coords: &[Vec<String>]) -> Result<(), CircuitError> {
    let pairs = match coords {
        [x, y] => [x, y],
        [x, y, z] if z == &["1", "0"] => [x, y],
        _ => {
            return Err(shape_error(
                name,
                format!("expected 2 coordinate pairs, got {}", coords.len()),
            ))
        }
    };
    for pair in pairs {
        if pair.len() != 2 {
            return Err(shape_error(
                name,
                format!("expected 2 limbs per coordinate, got {}", pair.len()),
            ));
        }
        for limb in pair {
            check_decimal(name, limb)?;
        }
    }
    Ok(())
}

fn decode_g1(coords: &[String]) -> Option<G1Affine> {
    let x = parse_decimal::<Fq>(&coords[0])?;
    let y = parse_decimal::<Fq>(&coords[1])?;
    let point = G1Affine::new_unchecked(x, y);
    (point.is_on_curve() && point.is_in_correct_subgroup_assuming_on_curve()).then_some(point)
}

fn decode_g2(coords: &[Vec<String>]) -> Option<G2Affine> {
    let fq2 = |pair: &[String]| -> Option<Fq2> {
        Some(Fq2::new(parse_decimal::<Fq>(&pair[0])?, parse_decimal::<Fq>(&pair[1])?))
    };
    let point = G2Affine::new_unchecked(fq2(&coords[0])?, fq2(&coords[1])?);
    (point.is_on_curve() && point.is_in_correct_subgroup_assuming_on_curve()).then_some(point)
}

fn encode_g1(point: &G1Affine) -> Vec<String> {
    vec![to_decimal(&point.x), to_decimal(&point.y)]
}

fn encode_g2(point: &G2Affine) -> Vec<Vec<String>> {
    vec![
        vec![to_decimal(&point.x.c0), to_decimal(&point.x.c1)],
        vec![to_decimal(&point.y.c0), to_decimal(&point.y.c1)],
    ]
}
