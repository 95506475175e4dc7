use std::sync::Arc;

use vote_circuits::testing::shared_artifacts;
use vote_circuits::{generate, ProofBundle, VoteSubmission};

use crate::services::Ledger;
use crate::state::AppState;
use crate::utils::config::Config;

pub fn test_ledger() -> Ledger {
    Ledger::in_memory(shared_artifacts().verifying_key.clone())
}

pub fn test_state() -> AppState {
    AppState::new(Arc::new(test_ledger()), Arc::new(Config::for_tests()))
}

/// Proves a vote against the shared test keys.
pub fn prove_vote(vote: u8, nullifier_seed: &str, secret: &str) -> ProofBundle {
    generate(vote, nullifier_seed, secret, shared_artifacts()).expect("test proof")
}

pub fn submission(vote: u8, nullifier_seed: &str, secret: &str) -> VoteSubmission {
    prove_vote(vote, nullifier_seed, secret).into()
}
