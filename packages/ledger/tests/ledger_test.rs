use std::sync::Arc;

use vote_circuits::{FieldElement, PublicSignals, VoteSubmission};
use vote_ledger::models::{LedgerEvent, MismatchReason, Tally};
use vote_ledger::utils::test_setup::{submission, test_ledger};
use vote_ledger::LedgerError;

fn signals(submission: &VoteSubmission) -> PublicSignals {
    submission.signals().unwrap()
}

#[tokio::test]
async fn test_cast_vote_scenario() {
    let ledger = test_ledger();
    let mut events = ledger.subscribe();
    let vote = submission(1, "123456", "mysecret");

    let cast = ledger.cast_vote(&vote).await.unwrap();
    assert_eq!(cast.nullifier_hash, signals(&vote).nullifier_hash);
    assert_eq!(events.recv().await.unwrap(), LedgerEvent::VoteCast(cast));
    assert!(ledger.is_spent(&cast.nullifier_hash).await);

    // Identical resubmission.
    let err = ledger.cast_vote(&vote).await.unwrap_err();
    assert_eq!(err, LedgerError::DoubleVote);
    assert_eq!(err.to_string(), "Vote already cast");
    assert_eq!(ledger.spent_count().await, 1);
    assert_eq!(ledger.tally().await, Tally::default());
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn test_same_nullifier_other_vote_is_double_vote() {
    let ledger = test_ledger();
    ledger
        .cast_vote(&submission(1, "55", "shared"))
        .await
        .unwrap();

    // Same seed and secret, opposite choice: the nullifier does not move.
    let err = ledger
        .cast_vote(&submission(0, "55", "shared"))
        .await
        .unwrap_err();
    assert_eq!(err, LedgerError::DoubleVote);
}

#[tokio::test]
async fn test_tally_counts_yes_and_no() {
    let ledger = test_ledger();
    let yes = submission(1, "1", "alice");
    let no = submission(0, "2", "bob");
    ledger.cast_vote(&yes).await.unwrap();
    ledger.cast_vote(&no).await.unwrap();

    let report = ledger
        .tally_votes(&[signals(&yes).vote_hash], &[signals(&no).vote_hash])
        .await
        .unwrap();

    assert_eq!(report.yes_counted, 1);
    assert_eq!(report.no_counted, 1);
    assert!(report.mismatches.is_empty());
    assert_eq!(ledger.yes_votes().await, 1);
    assert_eq!(ledger.no_votes().await, 1);
}

#[tokio::test]
async fn test_tally_is_idempotent() {
    let ledger = test_ledger();
    let yes = submission(1, "3", "carol");
    let no = submission(0, "4", "dave");
    ledger.cast_vote(&yes).await.unwrap();
    ledger.cast_vote(&no).await.unwrap();

    let yes_hashes = [signals(&yes).vote_hash];
    let no_hashes = [signals(&no).vote_hash];
    ledger.tally_votes(&yes_hashes, &no_hashes).await.unwrap();
    let again = ledger.tally_votes(&yes_hashes, &no_hashes).await.unwrap();

    assert_eq!(again.yes_counted, 0);
    assert_eq!(again.no_counted, 0);
    assert_eq!(
        ledger.tally().await,
        Tally {
            yes_votes: 1,
            no_votes: 1
        }
    );
}

#[tokio::test]
async fn test_votes_cast_after_a_tally_are_counted_later() {
    let ledger = test_ledger();
    let first = submission(1, "5", "erin");
    ledger.cast_vote(&first).await.unwrap();
    ledger
        .tally_votes(&[signals(&first).vote_hash], &[])
        .await
        .unwrap();

    let second = submission(1, "6", "frank");
    ledger.cast_vote(&second).await.unwrap();
    ledger
        .tally_votes(
            &[signals(&first).vote_hash, signals(&second).vote_hash],
            &[],
        )
        .await
        .unwrap();

    assert_eq!(ledger.yes_votes().await, 2);
}

#[tokio::test]
async fn test_ambiguous_partition_is_reported_not_counted() {
    let ledger = test_ledger();
    let a = submission(1, "7", "grace");
    let b = submission(0, "8", "heidi");
    let c = submission(0, "9", "ivan");
    for vote in [&a, &b, &c] {
        ledger.cast_vote(vote).await.unwrap();
    }

    let stray = FieldElement::from(424242u64);
    let report = ledger
        .tally_votes(
            &[signals(&a).vote_hash, signals(&b).vote_hash, stray],
            &[signals(&b).vote_hash],
        )
        .await
        .unwrap();

    assert_eq!(report.yes_counted, 1);
    assert_eq!(report.no_counted, 0);
    assert_eq!(report.unmatched, vec![stray]);
    assert_eq!(report.mismatches.len(), 2);
    let reason_for = |n: FieldElement| {
        report
            .mismatches
            .iter()
            .find(|m| m.nullifier_hash == n)
            .map(|m| m.reason)
    };
    assert_eq!(
        reason_for(signals(&b).nullifier_hash),
        Some(MismatchReason::InBothSets)
    );
    assert_eq!(
        reason_for(signals(&c).nullifier_hash),
        Some(MismatchReason::NotPartitioned)
    );

    // A corrected batch picks up what was skipped.
    let report = ledger
        .tally_votes(&[], &[signals(&b).vote_hash, signals(&c).vote_hash])
        .await
        .unwrap();
    assert_eq!(report.no_counted, 2);
    assert_eq!(
        ledger.tally().await,
        Tally {
            yes_votes: 1,
            no_votes: 2
        }
    );
}

#[tokio::test]
async fn test_order_independence() {
    let votes = vec![
        submission(1, "10", "a"),
        submission(0, "11", "b"),
        submission(1, "12", "c"),
        submission(1, "13", "d"),
        submission(0, "14", "e"),
    ];
    let yes: Vec<_> = votes
        .iter()
        .zip([1, 0, 1, 1, 0])
        .filter(|(_, v)| *v == 1)
        .map(|(s, _)| signals(s).vote_hash)
        .collect();
    let no: Vec<_> = votes
        .iter()
        .zip([1, 0, 1, 1, 0])
        .filter(|(_, v)| *v == 0)
        .map(|(s, _)| signals(s).vote_hash)
        .collect();

    let mut results = Vec::new();
    for order in [[0, 1, 2, 3, 4], [4, 3, 2, 1, 0], [2, 0, 4, 1, 3]] {
        let ledger = test_ledger();
        for i in order {
            ledger.cast_vote(&votes[i]).await.unwrap();
        }
        ledger.tally_votes(&yes, &no).await.unwrap();
        results.push(ledger.tally().await);
    }

    assert!(results.iter().all(|t| *t == results[0]));
    assert_eq!(
        results[0],
        Tally {
            yes_votes: 3,
            no_votes: 2
        }
    );
}

#[tokio::test]
async fn test_corrupted_point_is_invalid_proof() {
    let ledger = test_ledger();
    let mut vote = submission(1, "15", "mallory");
    vote.proof.pi_a[1] = "3".to_string();

    assert_eq!(
        ledger.cast_vote(&vote).await.unwrap_err(),
        LedgerError::InvalidProof
    );
    assert!(!ledger.is_spent(&signals(&vote).nullifier_hash).await);
    assert_eq!(ledger.spent_count().await, 0);
}

#[tokio::test]
async fn test_forged_signals_are_invalid_proof() {
    let ledger = test_ledger();
    let honest = submission(1, "16", "oscar");
    let other = submission(0, "16", "oscar");

    let mut forged = honest.clone();
    forged.public_signals[1] = other.public_signals[1].clone();

    assert_eq!(
        ledger.cast_vote(&forged).await.unwrap_err(),
        LedgerError::InvalidProof
    );
    // The honest proof for the same nullifier still goes through.
    assert!(ledger.cast_vote(&honest).await.is_ok());
}

#[tokio::test]
async fn test_shape_errors() {
    let ledger = test_ledger();
    let vote = submission(1, "17", "peggy");

    let mut short = vote.clone();
    short.public_signals.pop();
    assert!(matches!(
        ledger.cast_vote(&short).await,
        Err(LedgerError::InvalidProofShape(_))
    ));

    let mut long = vote.clone();
    long.public_signals.push("1".to_string());
    assert!(matches!(
        ledger.cast_vote(&long).await,
        Err(LedgerError::InvalidProofShape(_))
    ));

    let mut bad_point = vote.clone();
    bad_point.proof.pi_b.pop();
    assert!(matches!(
        ledger.cast_vote(&bad_point).await,
        Err(LedgerError::InvalidProofShape(_))
    ));

    assert_eq!(ledger.spent_count().await, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_duplicates_accept_once() {
    let ledger = Arc::new(test_ledger());
    let vote = submission(1, "18", "trent");

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let ledger = ledger.clone();
            let vote = vote.clone();
            tokio::spawn(async move { ledger.cast_vote(&vote).await })
        })
        .collect();

    let mut accepted = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => accepted += 1,
            Err(e) => assert_eq!(e, LedgerError::DoubleVote),
        }
    }

    assert_eq!(accepted, 1);
    assert_eq!(ledger.spent_count().await, 1);
}
