//! Assignment verification and audit digests.
//!
//! [`verify_derangement`] checks that a matching is a fixed-point-free
//! permutation of its input. [`assignment_digest`] is a SHA-256 commitment
//! over the pairs so a finished round can be logged and later audited
//! without writing who gives to whom into the logs.

use std::collections::HashSet;

use giftswap_types::{GiftswapError, Matching, Participant, Result, RoundId};
use sha2::{Digest, Sha256};

/// Check the derangement invariants of `matching` against `participants`:
/// - one match per participant
/// - every participant is a giver exactly once and a receiver exactly once
/// - nobody is their own receiver
/// - no outsider appears on either side
///
/// # Errors
/// `InvalidAssignment` naming the first violated invariant.
pub fn verify_derangement(participants: &[Participant], matching: &Matching) -> Result<()> {
    let invalid = |reason: String| Err(GiftswapError::InvalidAssignment { reason });

    if matching.len() != participants.len() {
        return invalid(format!(
            "{} matches for {} participants",
            matching.len(),
            participants.len()
        ));
    }

    let pool: HashSet<_> = participants.iter().map(|p| &p.id).collect();
    let mut givers = HashSet::with_capacity(matching.len());
    let mut receivers = HashSet::with_capacity(matching.len());

    for pair in matching {
        if pair.is_self_assignment() {
            return invalid(format!("{} assigned to themselves", pair.giver.id));
        }
        if !pool.contains(&pair.giver.id) || !pool.contains(&pair.receiver.id) {
            return invalid(format!("{pair} involves a non-participant"));
        }
        if !givers.insert(&pair.giver.id) {
            return invalid(format!("{} gives twice", pair.giver.id));
        }
        if !receivers.insert(&pair.receiver.id) {
            return invalid(format!("{} receives twice", pair.receiver.id));
        }
    }

    Ok(())
}

/// Compute the audit digest of a round's matching.
///
/// Depends on the round id and the ordered `(giver, receiver)` id pairs, so
/// the same round re-run with different draws yields a different digest.
#[must_use]
pub fn assignment_digest(round: RoundId, matching: &Matching) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(b"giftswap:assignment:v1:");
    hasher.update(round.0.as_bytes());
    hasher.update((matching.len() as u64).to_le_bytes());

    for pair in matching {
        for id in [&pair.giver.id, &pair.receiver.id] {
            hasher.update((id.as_str().len() as u64).to_le_bytes());
            hasher.update(id.as_str().as_bytes());
        }
    }

    let result = hasher.finalize();
    let mut digest = [0u8; 32];
    digest.copy_from_slice(&result);
    digest
}

/// Hex form of [`assignment_digest`], as written to logs.
#[must_use]
pub fn assignment_digest_hex(round: RoundId, matching: &Matching) -> String {
    hex::encode(assignment_digest(round, matching))
}
