use vote_circuits::testing::shared_artifacts;
use vote_ledger::models::Tally;
use vote_ledger::utils::test_setup::submission;
use vote_ledger::{Ledger, LedgerError, LedgerStore};

fn open(path: &std::path::Path) -> Ledger {
    let store = LedgerStore::persistent(path).unwrap();
    Ledger::open(store, shared_artifacts().verifying_key.clone()).unwrap()
}

#[tokio::test]
async fn test_spent_set_and_tally_survive_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ledger.db");

    let yes = submission(1, "900", "rupert");
    let no = submission(0, "901", "sybil");
    let late = submission(1, "902", "trudy");
    let yes_hash = yes.signals().unwrap().vote_hash;
    let no_hash = no.signals().unwrap().vote_hash;

    {
        let ledger = open(&path);
        ledger.cast_vote(&yes).await.unwrap();
        ledger.cast_vote(&no).await.unwrap();
        ledger.tally_votes(&[yes_hash], &[no_hash]).await.unwrap();
        ledger.cast_vote(&late).await.unwrap();
    }

    let ledger = open(&path);
    assert_eq!(ledger.spent_count().await, 3);
    assert_eq!(
        ledger.tally().await,
        Tally {
            yes_votes: 1,
            no_votes: 1
        }
    );

    // Spent before the restart, still spent after it.
    assert_eq!(
        ledger.cast_vote(&yes).await.unwrap_err(),
        LedgerError::DoubleVote
    );

    // Replaying the earlier batch counts only the vote it never saw.
    let late_hash = late.signals().unwrap().vote_hash;
    let report = ledger
        .tally_votes(&[yes_hash, late_hash], &[no_hash])
        .await
        .unwrap();
    assert_eq!(report.yes_counted, 1);
    assert_eq!(report.no_counted, 0);
    assert_eq!(
        ledger.tally().await,
        Tally {
            yes_votes: 2,
            no_votes: 1
        }
    );
}
