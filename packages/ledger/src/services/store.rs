use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use sled::{Batch, Db};
use tracing::info;
use vote_circuits::FieldElement;

use crate::error::LedgerError;
use crate::models::{NullifierRecord, Tally};

const NULLIFIER_PREFIX: &[u8] = b"nullifier/";
const TALLY_KEY: &[u8] = b"tally";

/// Durable side of the ledger. Every write is one atomic batch flushed to
/// disk before returning, so a crash leaves either all of a submission or
/// none of it.
#[derive(Clone)]
pub struct LedgerStore {
    backend: Arc<StoreBackend>,
}

enum StoreBackend {
    InMemory,
    Persistent(Db),
}

/// Everything the ledger needs to resume after a restart.
#[derive(Debug, Default)]
pub struct Snapshot {
    pub records: BTreeMap<FieldElement, NullifierRecord>,
    pub tally: Tally,
}

impl LedgerStore {
    /// Keeps nothing; state lives only as long as the process.
    pub fn in_memory() -> Self {
        Self {
            backend: Arc::new(StoreBackend::InMemory),
        }
    }

    pub fn persistent(path: impl AsRef<Path>) -> Result<Self, LedgerError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    LedgerError::Storage(format!(
                        "failed to create directory for ledger db at {}: {e}",
                        path.display()
                    ))
                })?;
            }
        }
        let db = sled::open(path).map_err(|e| {
            LedgerError::Storage(format!("failed to open ledger db at {}: {e}", path.display()))
        })?;
        info!("opened ledger db at {}", path.display());
        Ok(Self {
            backend: Arc::new(StoreBackend::Persistent(db)),
        })
    }

    pub fn load(&self) -> Result<Snapshot, LedgerError> {
        let db = match &*self.backend {
            StoreBackend::InMemory => return Ok(Snapshot::default()),
            StoreBackend::Persistent(db) => db,
        };

        let mut snapshot = Snapshot::default();
        for entry in db.scan_prefix(NULLIFIER_PREFIX) {
            let (_, value) = entry.map_err(storage)?;
            let record: NullifierRecord = serde_json::from_slice(&value).map_err(corrupt)?;
            snapshot.records.insert(record.nullifier_hash, record);
        }
        if let Some(value) = db.get(TALLY_KEY).map_err(storage)? {
            snapshot.tally = serde_json::from_slice(&value).map_err(corrupt)?;
        }
        Ok(snapshot)
    }

    /// Writes a newly spent nullifier.
    pub async fn commit_vote(&self, record: &NullifierRecord) -> Result<(), LedgerError> {
        self.write(&[*record], None).await
    }

    /// Writes the counters together with the records they now include.
    pub async fn commit_tally(
        &self,
        tally: Tally,
        records: &[NullifierRecord],
    ) -> Result<(), LedgerError> {
        self.write(records, Some(tally)).await
    }

    /// The batch and its fsync run on a blocking worker.
    async fn write(
        &self,
        records: &[NullifierRecord],
        tally: Option<Tally>,
    ) -> Result<(), LedgerError> {
        let db = match &*self.backend {
            StoreBackend::InMemory => return Ok(()),
            StoreBackend::Persistent(db) => db,
        };

        let mut batch = Batch::default();
        for record in records {
            let value = serde_json::to_vec(record).map_err(corrupt)?;
            batch.insert(record_key(&record.nullifier_hash), value);
        }
        if let Some(tally) = tally {
            batch.insert(TALLY_KEY, serde_json::to_vec(&tally).map_err(corrupt)?);
        }

        let db = db.clone();
        tokio::task::spawn_blocking(move || {
            db.apply_batch(batch).map_err(storage)?;
            db.flush().map_err(storage)?;
            Ok(())
        })
        .await
        .map_err(|e| LedgerError::Worker(e.to_string()))?
    }
}

fn record_key(nullifier_hash: &FieldElement) -> Vec<u8> {
    let mut key = NULLIFIER_PREFIX.to_vec();
    key.extend_from_slice(nullifier_hash.to_decimal().as_bytes());
    key
}

fn storage(e: sled::Error) -> LedgerError {
    LedgerError::Storage(format!("ledger db error: {e}"))
}

fn corrupt(e: serde_json::Error) -> LedgerError {
    LedgerError::Storage(format!("ledger db entry is corrupt: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(n: u64, v: u64) -> NullifierRecord {
        NullifierRecord {
            nullifier_hash: FieldElement::from(n),
            vote_hash: FieldElement::from(v),
            tallied: false,
        }
    }

    #[tokio::test]
    async fn test_in_memory_keeps_nothing() {
        let store = LedgerStore::in_memory();
        store.commit_vote(&record(1, 2)).await.unwrap();
        let snapshot = store.load().unwrap();
        assert!(snapshot.records.is_empty());
        assert_eq!(snapshot.tally, Tally::default());
    }

    #[tokio::test]
    async fn test_persistent_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("ledger.db");

        {
            let store = LedgerStore::persistent(&path).unwrap();
            store.commit_vote(&record(1, 10)).await.unwrap();
            store.commit_vote(&record(2, 20)).await.unwrap();

            let mut tallied = record(1, 10);
            tallied.tallied = true;
            store
                .commit_tally(
                    Tally {
                        yes_votes: 1,
                        no_votes: 0,
                    },
                    &[tallied],
                )
                .await
                .unwrap();
        }

        let snapshot = LedgerStore::persistent(&path).unwrap().load().unwrap();
        assert_eq!(snapshot.records.len(), 2);
        assert!(snapshot.records[&FieldElement::from(1u64)].tallied);
        assert!(!snapshot.records[&FieldElement::from(2u64)].tallied);
        assert_eq!(snapshot.tally.yes_votes, 1);
    }

    #[tokio::test]
    async fn test_commit_is_durable_before_returning() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.db");
        let store = LedgerStore::persistent(&path).unwrap();

        store.commit_vote(&record(7, 70)).await.unwrap();

        let StoreBackend::Persistent(db) = &*store.backend else {
            panic!("expected a persistent store");
        };
        assert!(db.contains_key(record_key(&FieldElement::from(7u64))).unwrap());
        assert_eq!(store.load().unwrap().records.len(), 1);
    }
}
