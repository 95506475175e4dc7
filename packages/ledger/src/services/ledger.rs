use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};
use vote_circuits::{verify, Bn254, FieldElement, PreparedVerifyingKey, VoteSubmission};

use crate::error::LedgerError;
use crate::models::{LedgerEvent, NullifierRecord, Tally, TallyReport, VoteCast};
use crate::services::store::LedgerStore;
use crate::services::tally;

const EVENT_CAPACITY: usize = 1000;

struct LedgerState {
    records: BTreeMap<FieldElement, NullifierRecord>,
    tally: Tally,
}

/// Spent nullifiers and running tally for one vote.
///
/// All mutation happens under a single lock that also covers the durable
/// write, so the in-memory view and the store never disagree. Proof
/// verification runs before the lock is taken.
pub struct Ledger {
    state: Mutex<LedgerState>,
    store: LedgerStore,
    verifying_key: Arc<PreparedVerifyingKey<Bn254>>,
    events: broadcast::Sender<LedgerEvent>,
}

impl Ledger {
    /// Opens a ledger over `store`, resuming whatever it already holds.
    pub fn open(
        store: LedgerStore,
        verifying_key: PreparedVerifyingKey<Bn254>,
    ) -> Result<Self, LedgerError> {
        let snapshot = store.load()?;
        info!(
            spent = snapshot.records.len(),
            yes_votes = snapshot.tally.yes_votes,
            no_votes = snapshot.tally.no_votes,
            "ledger opened"
        );
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Ok(Self {
            state: Mutex::new(LedgerState {
                records: snapshot.records,
                tally: snapshot.tally,
            }),
            store,
            verifying_key: Arc::new(verifying_key),
            events,
        })
    }

    pub fn in_memory(verifying_key: PreparedVerifyingKey<Bn254>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            state: Mutex::new(LedgerState {
                records: BTreeMap::new(),
                tally: Tally::default(),
            }),
            store: LedgerStore::in_memory(),
            verifying_key: Arc::new(verifying_key),
            events,
        }
    }

    /// Accepts a vote if its proof verifies and its nullifier is unspent.
    ///
    /// The spent check is repeated under the lock right before the insert:
    /// two submissions of the same nullifier can both pass the early check
    /// while their proofs are being verified, and only one may win.
    pub async fn cast_vote(&self, submission: &VoteSubmission) -> Result<VoteCast, LedgerError> {
        let signals = submission.signals()?;
        let nullifier_hash = signals.nullifier_hash;

        if self.is_spent(&nullifier_hash).await {
            debug!(%nullifier_hash, "rejecting spent nullifier");
            return Err(LedgerError::DoubleVote);
        }

        let verifying_key = self.verifying_key.clone();
        let proof = submission.proof.clone();
        let valid = tokio::task::spawn_blocking(move || {
            proof
                .decode()
                .map(|decoded| decoded.is_some_and(|p| verify(&p, &signals, &verifying_key)))
        })
        .await
        .map_err(|e| LedgerError::Worker(e.to_string()))??;

        if !valid {
            warn!(%nullifier_hash, "rejecting invalid proof");
            return Err(LedgerError::InvalidProof);
        }

        let mut state = self.state.lock().await;
        if state.records.contains_key(&nullifier_hash) {
            return Err(LedgerError::DoubleVote);
        }

        let record = NullifierRecord::spent(&signals);
        self.store.commit_vote(&record).await?;
        state.records.insert(nullifier_hash, record);

        let event = VoteCast {
            nullifier_hash,
            vote_hash: signals.vote_hash,
        };
        // No subscribers is fine.
        let _ = self.events.send(LedgerEvent::VoteCast(event));
        info!(%nullifier_hash, vote_hash = %event.vote_hash, "vote cast");

        Ok(event)
    }

    /// Counts every untallied spent vote whose hash the aggregator placed in
    /// exactly one of the two sets.
    pub async fn tally_votes(
        &self,
        yes_hashes: &[FieldElement],
        no_hashes: &[FieldElement],
    ) -> Result<TallyReport, LedgerError> {
        let mut state = self.state.lock().await;
        let outcome = tally::partition(&state.records, yes_hashes, no_hashes);

        for mismatch in &outcome.mismatches {
            warn!(
                nullifier_hash = %mismatch.nullifier_hash,
                reason = ?mismatch.reason,
                "vote left untallied"
            );
        }

        if outcome.is_empty() {
            return Ok(outcome.into_report(state.tally));
        }

        let updated_tally = outcome.apply_to(state.tally);
        let updated_records: Vec<NullifierRecord> = outcome
            .counted()
            .filter_map(|n| state.records.get(n))
            .map(|record| NullifierRecord {
                tallied: true,
                ..*record
            })
            .collect();

        self.store
            .commit_tally(updated_tally, &updated_records)
            .await?;
        for record in updated_records {
            state.records.insert(record.nullifier_hash, record);
        }
        state.tally = updated_tally;

        let _ = self.events.send(LedgerEvent::TallyUpdated(updated_tally));
        info!(
            yes_votes = updated_tally.yes_votes,
            no_votes = updated_tally.no_votes,
            "tally updated"
        );

        Ok(outcome.into_report(updated_tally))
    }

    pub async fn is_spent(&self, nullifier_hash: &FieldElement) -> bool {
        self.state.lock().await.records.contains_key(nullifier_hash)
    }

    pub async fn tally(&self) -> Tally {
        self.state.lock().await.tally
    }

    pub async fn yes_votes(&self) -> u64 {
        self.tally().await.yes_votes
    }

    pub async fn no_votes(&self) -> u64 {
        self.tally().await.no_votes
    }

    pub async fn spent_count(&self) -> usize {
        self.state.lock().await.records.len()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LedgerEvent> {
        self.events.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.events.receiver_count()
    }
}
