use crate::models::{ProofState, ProofStatus};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tokio::task::AbortHandle;
use tracing::{debug, info};
use vote_circuits::ProofBundle;

/// Finished jobs kept for status queries before the oldest are dropped.
pub const DEFAULT_FINISHED_RETENTION: usize = 1024;

/// Registry of proof jobs submitted in the background.
///
/// A job moves `pending -> running -> completed | failed | cancelled`. Once
/// a job is terminal later updates are ignored, so a worker finishing after
/// a cancellation cannot resurrect it.
pub struct ProofManager {
    proofs: Arc<RwLock<HashMap<String, ProofStatus>>>,
    handles: Mutex<HashMap<String, AbortHandle>>,
    finished: Mutex<VecDeque<String>>,
    retention: usize,
}

impl Default for ProofManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ProofManager {
    pub fn new() -> Self {
        Self::with_retention(DEFAULT_FINISHED_RETENTION)
    }

    pub fn with_retention(retention: usize) -> Self {
        ProofManager {
            proofs: Arc::new(RwLock::new(HashMap::new())),
            handles: Mutex::new(HashMap::new()),
            finished: Mutex::new(VecDeque::new()),
            retention,
        }
    }

    pub async fn register_proof_request(&self) -> String {
        let proof_id = uuid::Uuid::new_v4().to_string();
        let status = ProofStatus {
            state: ProofState::Pending,
            proof_id: proof_id.clone(),
            message: None,
            output: None,
        };
        self.proofs.write().await.insert(proof_id.clone(), status);
        proof_id
    }

    /// Records the task running `proof_id`. A job that already finished,
    /// for instance one cancelled before its task was attached, gets the
    /// task aborted straight away.
    pub async fn attach_handle(&self, proof_id: &str, handle: AbortHandle) {
        // Held across the check so a concurrent terminal update either sees
        // the handle or is seen here.
        let mut handles = self.handles.lock().await;
        let live = matches!(
            self.get_proof_status(proof_id).await,
            Some(status) if !status.state.is_terminal()
        );
        if live {
            handles.insert(proof_id.to_string(), handle);
        } else {
            handle.abort();
        }
    }

    pub async fn get_proof_status(&self, proof_id: &str) -> Option<ProofStatus> {
        self.proofs.read().await.get(proof_id).cloned()
    }

    pub async fn update_proof_status(
        &self,
        proof_id: &str,
        state: ProofState,
        message: Option<String>,
    ) -> bool {
        self.update_proof_status_with_output(proof_id, state, message, None)
            .await
    }

    pub async fn update_proof_status_with_output(
        &self,
        proof_id: &str,
        state: ProofState,
        message: Option<String>,
        output: Option<ProofBundle>,
    ) -> bool {
        let updated = match self.proofs.write().await.get_mut(proof_id) {
            Some(status) if !status.state.is_terminal() => {
                status.state = state;
                status.message = message;
                status.output = output;
                true
            }
            _ => false,
        };

        if updated {
            debug!(proof_id, ?state, "proof status updated");
            if state.is_terminal() {
                let handle = self.handles.lock().await.remove(proof_id);
                if state == ProofState::Cancelled {
                    if let Some(handle) = handle {
                        handle.abort();
                    }
                }
                self.retire(proof_id).await;
            }
        }
        updated
    }

    /// Stops a job that has not finished yet. Returns `false` for unknown or
    /// already finished jobs.
    pub async fn cancel(&self, proof_id: &str) -> bool {
        let cancelled = self
            .update_proof_status(
                proof_id,
                ProofState::Cancelled,
                Some("Cancelled by caller".to_string()),
            )
            .await;
        if cancelled {
            info!(proof_id, "proof job cancelled");
        }
        cancelled
    }

    pub async fn running_jobs(&self) -> usize {
        self.handles.lock().await.len()
    }

    async fn retire(&self, proof_id: &str) {
        let evicted: Vec<String> = {
            let mut finished = self.finished.lock().await;
            finished.push_back(proof_id.to_string());
            let excess = finished.len().saturating_sub(self.retention);
            finished.drain(..excess).collect()
        };
        if evicted.is_empty() {
            return;
        }

        let mut proofs = self.proofs.write().await;
        for id in &evicted {
            proofs.remove(id);
        }
        debug!(evicted = evicted.len(), "finished proof jobs evicted");
    }
}
