use serde::{Deserialize, Serialize};
use std::fmt;
use vote_circuits::{CircuitError, ProofBundle, VoteSecret};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProofState {
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl ProofState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ProofState::Completed | ProofState::Failed | ProofState::Cancelled
        )
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ProofStatus {
    pub state: ProofState,
    pub proof_id: String,
    pub message: Option<String>,
    pub output: Option<ProofBundle>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ProofResponse {
    pub success: bool,
    pub message: String,
    pub proof_id: String,
}

/// What a voter sends to the prover. The secrets stay as text until the
/// proving worker parses them.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofRequest {
    pub vote: u8,
    #[serde(alias = "nullifier_seed")]
    pub nullifier_seed: String,
    pub secret: String,
}

impl ProofRequest {
    pub fn to_secret(&self) -> Result<VoteSecret, CircuitError> {
        VoteSecret::parse(self.vote, &self.nullifier_seed, &self.secret)
    }
}

impl fmt::Debug for ProofRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProofRequest")
            .field("vote", &"<hidden>")
            .finish_non_exhaustive()
    }
}
