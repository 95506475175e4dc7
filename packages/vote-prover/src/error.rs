use std::time::Duration;
use thiserror::Error;
use vote_circuits::CircuitError;

/// Everything that can end a proving attempt. Each one is terminal for the
/// attempt: retry with fresh secrets rather than reusing the nullifier.
#[derive(Error, Debug)]
pub enum ProverError {
    #[error(transparent)]
    Circuit(#[from] CircuitError),
    #[error("Proof generation failed: timed out after {0:?}")]
    Timeout(Duration),
    #[error("Proof generation failed: cancelled")]
    Cancelled,
    #[error("Proof generation failed: worker stopped: {0}")]
    Worker(String),
}

impl ProverError {
    /// Folds the prover-side failures into the three kinds callers see.
    pub fn kind(&self) -> ProverErrorKind {
        match self {
            ProverError::Circuit(CircuitError::MalformedInput(_)) => ProverErrorKind::MalformedInput,
            ProverError::Circuit(CircuitError::MissingArtifacts(_)) => {
                ProverErrorKind::MissingArtifacts
            }
            _ => ProverErrorKind::ProofGeneration,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProverErrorKind {
    MalformedInput,
    MissingArtifacts,
    ProofGeneration,
}
