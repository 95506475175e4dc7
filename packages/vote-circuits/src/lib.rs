pub mod artifacts;
pub mod circuits;
pub mod commitment;
pub mod error;
pub mod factory;
pub mod field;
pub mod hash;
pub mod inputs;
pub mod proof;
pub mod prover;
pub mod traits;
pub mod verifier;

pub use artifacts::*;
pub use circuits::*;
pub use commitment::*;
pub use error::*;
pub use factory::*;
pub use field::FieldElement;
pub use inputs::*;
pub use proof::*;
pub use prover::*;
pub use traits::*;
pub use verifier::*;

pub use ark_bn254::{Bn254, Fr};
pub use ark_groth16::{PreparedVerifyingKey, Proof, ProvingKey};
