use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CircuitError {
    #[error("Malformed input: {0}")]
    MalformedInput(String),
    #[error("Circuit artifacts unavailable: {0}")]
    MissingArtifacts(String),
    #[error("Proof generation failed: {0}")]
    ProofGeneration(String),
    #[error("Invalid proof shape: {0}")]
    InvalidProofShape(String),
    #[error("Serialization failed: {0}")]
    Serialization(String),
}

impl From<ark_relations::r1cs::SynthesisError> for CircuitError {
    fn from(e: ark_relations::r1cs::SynthesisError) -> Self {
        CircuitError::ProofGeneration(e.to_string())
    }
}

impl From<ark_serialize::SerializationError> for CircuitError {
    fn from(e: ark_serialize::SerializationError) -> Self {
        CircuitError::Serialization(e.to_string())
    }
}
