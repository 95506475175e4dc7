//! Partitioning of spent votes into yes and no.
//!
//! The aggregator hands over two sets of vote hashes; nothing here can tell
//! whether a hash really belongs to the set it was placed in. That trust is
//! left to whoever is allowed to call the tally endpoint.

use std::collections::{BTreeMap, BTreeSet};
use vote_circuits::FieldElement;

use crate::models::{MismatchReason, NullifierRecord, Tally, TallyMismatch, TallyReport};

/// Result of classifying the untallied records against one batch.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct TallyOutcome {
    pub yes: Vec<FieldElement>,
    pub no: Vec<FieldElement>,
    pub mismatches: Vec<TallyMismatch>,
    pub unmatched: Vec<FieldElement>,
}

impl TallyOutcome {
    /// Nullifiers whose records become tallied.
    pub fn counted(&self) -> impl Iterator<Item = &FieldElement> {
        self.yes.iter().chain(self.no.iter())
    }

    pub fn is_empty(&self) -> bool {
        self.yes.is_empty() && self.no.is_empty()
    }

    pub fn apply_to(&self, tally: Tally) -> Tally {
        Tally {
            yes_votes: tally.yes_votes + self.yes.len() as u64,
            no_votes: tally.no_votes + self.no.len() as u64,
        }
    }

    pub fn into_report(self, tally: Tally) -> TallyReport {
        TallyReport {
            yes_counted: self.yes.len() as u64,
            no_counted: self.no.len() as u64,
            mismatches: self.mismatches,
            unmatched: self.unmatched,
            tally,
        }
    }
}

/// Classifies every untallied record by its vote hash.
///
/// Records already tallied are skipped, so replaying a batch counts nothing
/// twice. Ambiguous records are reported and left for a later batch.
pub fn partition(
    records: &BTreeMap<FieldElement, NullifierRecord>,
    yes_hashes: &[FieldElement],
    no_hashes: &[FieldElement],
) -> TallyOutcome {
    let yes: BTreeSet<_> = yes_hashes.iter().copied().collect();
    let no: BTreeSet<_> = no_hashes.iter().copied().collect();
    let mut outcome = TallyOutcome::default();

    for record in records.values().filter(|r| !r.tallied) {
        match (yes.contains(&record.vote_hash), no.contains(&record.vote_hash)) {
            (true, false) => outcome.yes.push(record.nullifier_hash),
            (false, true) => outcome.no.push(record.nullifier_hash),
            (in_yes, _) => outcome.mismatches.push(TallyMismatch {
                nullifier_hash: record.nullifier_hash,
                vote_hash: record.vote_hash,
                reason: if in_yes {
                    MismatchReason::InBothSets
                } else {
                    MismatchReason::NotPartitioned
                },
            }),
        }
    }

    let known: BTreeSet<_> = records.values().map(|r| r.vote_hash).collect();
    outcome.unmatched = yes
        .union(&no)
        .filter(|hash| !known.contains(hash))
        .copied()
        .collect();

    outcome
}
