use crate::models::{ProofRequest, ProofState};
use crate::proof::ProofManager;
use crate::ProverError;
use rand::rngs::OsRng;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{info, warn};
use vote_circuits::{prove, verify, CircuitArtifacts, CircuitError, ProofBundle, VoteSecret};

/// Runs vote proofs off the async runtime.
///
/// Proving never touches ledger state, so an abandoned or timed-out attempt
/// leaves nothing behind. Keys are loaded on first use; until they are
/// present every request fails with `MissingArtifacts`.
pub struct ProverNode {
    artifacts_dir: Option<PathBuf>,
    artifacts: OnceCell<Arc<CircuitArtifacts>>,
    pub proof_manager: Arc<ProofManager>,
    pub timeout: Duration,
}

impl ProverNode {
    pub fn new(artifacts_dir: PathBuf, proof_manager: Arc<ProofManager>, timeout: Duration) -> Self {
        Self {
            artifacts_dir: Some(artifacts_dir),
            artifacts: OnceCell::new(),
            proof_manager,
            timeout,
        }
    }

    pub fn with_artifacts(
        artifacts: Arc<CircuitArtifacts>,
        proof_manager: Arc<ProofManager>,
        timeout: Duration,
    ) -> Self {
        Self {
            artifacts_dir: None,
            artifacts: OnceCell::new_with(Some(artifacts)),
            proof_manager,
            timeout,
        }
    }

    pub async fn artifacts(&self) -> Result<Arc<CircuitArtifacts>, ProverError> {
        self.artifacts
            .get_or_try_init(|| async {
                let dir = self.artifacts_dir.clone().ok_or_else(|| {
                    CircuitError::MissingArtifacts("no artifacts directory configured".into())
                })?;
                let loaded = tokio::task::spawn_blocking(move || CircuitArtifacts::load(dir))
                    .await
                    .map_err(|e| ProverError::Worker(e.to_string()))??;
                Ok::<_, ProverError>(Arc::new(loaded))
            })
            .await
            .cloned()
    }

    /// Parses and proves a request.
    pub async fn generate_proof(&self, request: ProofRequest) -> Result<ProofBundle, ProverError> {
        let secret = request.to_secret()?;
        self.prove_secret(secret).await
    }

    /// Proves `secret` on a blocking worker under the node's timeout, then
    /// checks the proof against the verifying key before handing it out.
    pub async fn prove_secret(&self, secret: VoteSecret) -> Result<ProofBundle, ProverError> {
        let artifacts = self.artifacts().await?;

        let worker = tokio::task::spawn_blocking(move || {
            let (proof, signals) = prove(&secret, &artifacts.proving_key, &mut OsRng)?;
            if !verify(&proof, &signals, &artifacts.verifying_key) {
                return Err(CircuitError::ProofGeneration(
                    "generated proof does not verify".to_string(),
                ));
            }
            Ok(ProofBundle::new(&proof, &signals))
        });

        match tokio::time::timeout(self.timeout, worker).await {
            Ok(Ok(result)) => Ok(result?),
            Ok(Err(e)) if e.is_cancelled() => Err(ProverError::Cancelled),
            Ok(Err(e)) => Err(ProverError::Worker(e.to_string())),
            Err(_) => {
                warn!(timeout = ?self.timeout, "proof generation timed out");
                Err(ProverError::Timeout(self.timeout))
            }
        }
    }

    /// Queues a request as a background job and returns its id.
    pub async fn submit_job(self: &Arc<Self>, request: ProofRequest) -> String {
        let pm = self.proof_manager.clone();
        let proof_id = pm.register_proof_request().await;

        let node = self.clone();
        let job_id = proof_id.clone();
        let task = tokio::spawn(async move {
            if !node
                .proof_manager
                .update_proof_status(&job_id, ProofState::Running, None)
                .await
            {
                return;
            }

            match node.generate_proof(request).await {
                Ok(bundle) => {
                    node.proof_manager
                        .update_proof_status_with_output(
                            &job_id,
                            ProofState::Completed,
                            Some("Proof generated successfully".to_string()),
                            Some(bundle),
                        )
                        .await;
                }
                Err(e) => {
                    warn!(proof_id = %job_id, "proof job failed: {e}");
                    node.proof_manager
                        .update_proof_status(&job_id, ProofState::Failed, Some(e.to_string()))
                        .await;
                }
            }
        });
        pm.attach_handle(&proof_id, task.abort_handle()).await;

        info!(proof_id = %proof_id, "proof job accepted");
        proof_id
    }

    pub async fn cancel_job(&self, proof_id: &str) -> bool {
        self.proof_manager.cancel(proof_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ProverErrorKind;
    use vote_circuits::testing::setup_artifacts;
    use vote_circuits::{verify_wire, VoteValue};

    fn request(vote: u8, seed: &str, secret: &str) -> ProofRequest {
        ProofRequest {
            vote,
            nullifier_seed: seed.to_string(),
            secret: secret.to_string(),
        }
    }

    fn node_with_timeout(timeout: Duration) -> Arc<ProverNode> {
        Arc::new(ProverNode::with_artifacts(
            Arc::new(setup_artifacts().unwrap()),
            Arc::new(ProofManager::new()),
            timeout,
        ))
    }

    async fn wait_for_terminal(node: &ProverNode, proof_id: &str) -> ProofState {
        for _ in 0..600 {
            let state = node
                .proof_manager
                .get_proof_status(proof_id)
                .await
                .unwrap()
                .state;
            if state.is_terminal() {
                return state;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        panic!("proof job {proof_id} did not finish");
    }

    #[tokio::test]
    async fn test_generate_proof_verifies() {
        let node = node_with_timeout(Duration::from_secs(60));
        let bundle = node
            .generate_proof(request(1, "123456", "mysecret"))
            .await
            .unwrap();

        let artifacts = node.artifacts().await.unwrap();
        assert!(verify_wire(&bundle.proof, &bundle.public_signals, &artifacts.verifying_key).unwrap());
    }

    #[tokio::test]
    async fn test_random_secret_proves() {
        let node = node_with_timeout(Duration::from_secs(60));
        let secret = VoteSecret::random(VoteValue::No, &mut OsRng);
        let expected = secret.commitment().unwrap();

        let bundle = node.prove_secret(secret).await.unwrap();
        assert_eq!(bundle.public_signals[0], expected.nullifier_hash.to_decimal());
    }

    #[tokio::test]
    async fn test_malformed_request() {
        let node = node_with_timeout(Duration::from_secs(60));
        let err = node.generate_proof(request(2, "1", "2")).await.unwrap_err();
        assert_eq!(err.kind(), ProverErrorKind::MalformedInput);
    }

    #[tokio::test]
    async fn test_timeout_is_proof_generation_error() {
        let node = node_with_timeout(Duration::from_nanos(1));
        let err = node.generate_proof(request(0, "1", "2")).await.unwrap_err();
        assert!(matches!(err, ProverError::Timeout(_)));
        assert_eq!(err.kind(), ProverErrorKind::ProofGeneration);
    }

    #[tokio::test]
    async fn test_missing_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let node = ProverNode::new(
            dir.path().to_path_buf(),
            Arc::new(ProofManager::new()),
            Duration::from_secs(60),
        );
        let err = node.generate_proof(request(1, "1", "2")).await.unwrap_err();
        assert_eq!(err.kind(), ProverErrorKind::MissingArtifacts);
    }

    #[tokio::test]
    async fn test_artifacts_loaded_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        setup_artifacts().unwrap().save(dir.path()).unwrap();

        let node = ProverNode::new(
            dir.path().to_path_buf(),
            Arc::new(ProofManager::new()),
            Duration::from_secs(60),
        );
        assert!(node.generate_proof(request(1, "3", "4")).await.is_ok());
    }

    #[tokio::test]
    async fn test_job_completes_with_output() {
        let node = node_with_timeout(Duration::from_secs(60));
        let id = node.submit_job(request(1, "5", "6")).await;

        assert_eq!(wait_for_terminal(&node, &id).await, ProofState::Completed);
        let status = node.proof_manager.get_proof_status(&id).await.unwrap();
        assert_eq!(status.output.unwrap().public_signals.len(), 2);
    }

    #[tokio::test]
    async fn test_failed_job_records_message() {
        let node = node_with_timeout(Duration::from_secs(60));
        let id = node.submit_job(request(1, "", "6")).await;

        assert_eq!(wait_for_terminal(&node, &id).await, ProofState::Failed);
        let status = node.proof_manager.get_proof_status(&id).await.unwrap();
        assert!(status.message.unwrap().contains("Malformed input"));
        assert!(status.output.is_none());
    }

    #[tokio::test]
    async fn test_cancelled_job_stays_cancelled() {
        let node = node_with_timeout(Duration::from_secs(60));
        let id = node.submit_job(request(0, "7", "8")).await;

        if node.cancel_job(&id).await {
            assert_eq!(node.proof_manager.running_jobs().await, 0);
            tokio::time::sleep(Duration::from_millis(200)).await;
            let status = node.proof_manager.get_proof_status(&id).await.unwrap();
            assert_eq!(status.state, ProofState::Cancelled);
            assert!(status.output.is_none());
        } else {
            // The job beat the cancellation; it must have finished cleanly.
            assert_eq!(wait_for_terminal(&node, &id).await, ProofState::Completed);
        }
    }
}
