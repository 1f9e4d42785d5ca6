//! Single randomized matching attempt.
//!
//! ```text
//! attempt(participants, rng) -> Matching | DeadEnd
//! ```
//!
//! ## Algorithm
//!
//! 1. Walk participants in input order
//! 2. For each giver, the candidates are everyone except the giver and
//!    everyone already chosen as a receiver (kept in input order)
//! 3. No candidates left → the attempt fails with `DeadEnd`
//! 4. Otherwise draw one candidate uniformly and mark it taken
//!
//! Greedy commitment means an attempt can fail even though a derangement
//! exists: with `[A, B, C]`, drawing A→B then B→A leaves C with nobody. The
//! retry driver absorbs this. For N = 2 the single candidate of each giver is
//! always the other participant, so the attempt cannot fail.

use giftswap_types::{GiftswapError, Match, Matching, Participant, Result, validate_pool};

use crate::RandomSource;

/// Run one greedy randomized attempt.
///
/// Makes exactly one draw per participant on success.
///
/// # Errors
/// - `InsufficientParticipants` / `DuplicateParticipant` for an unpairable
///   input (never worth retrying)
/// - `DeadEnd` when a giver is left without candidates (worth retrying)
pub fn attempt<R: RandomSource + ?Sized>(
    participants: &[Participant],
    rng: &mut R,
) -> Result<Matching> {
    validate_pool(participants)?;

    let n = participants.len();
    let mut taken = vec![false; n];
    let mut matches = Vec::with_capacity(n);
    let mut candidates: Vec<usize> = Vec::with_capacity(n);

    for (giver_idx, giver) in participants.iter().enumerate() {
        candidates.clear();
        candidates.extend((0..n).filter(|&j| j != giver_idx && !taken[j]));

        if candidates.is_empty() {
            return Err(GiftswapError::DeadEnd {
                giver: giver.id.clone(),
            });
        }

        let receiver_idx = candidates[rng.draw(candidates.len())];
        taken[receiver_idx] = true;
        matches.push(Match {
            giver: giver.clone(),
            receiver: participants[receiver_idx].clone(),
        });
    }

    Ok(Matching::new(matches))
}
