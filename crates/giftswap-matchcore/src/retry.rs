//! Rejection-sampling retry driver.
//!
//! Repeats [`attempt`] until one succeeds. There is no retry cap: every
//! attempt has a failure probability strictly below 1 for N ≥ 2, so the loop
//! terminates with probability 1, but its latency has no deterministic upper
//! bound. Each attempt draws fresh randomness from the source; nothing from
//! a failed attempt is reused.

use std::sync::atomic::{AtomicU64, Ordering};

use giftswap_types::{GiftswapError, Matching, Participant, Result};

use crate::{RandomSource, matcher::attempt};

/// The result of a successful driver run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchOutcome {
    pub matching: Matching,
    /// Attempts used in this run, including the successful one.
    pub attempts: u64,
}

/// Drives [`attempt`] to success and counts attempts across runs.
#[derive(Debug, Default)]
pub struct MatchingRetryDriver {
    total_attempts: AtomicU64,
    total_runs: AtomicU64,
}

impl MatchingRetryDriver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Produce a derangement of `participants`.
    ///
    /// The input is borrowed immutably for the whole loop.
    ///
    /// # Errors
    /// Returns validation errors (`InsufficientParticipants`,
    /// `DuplicateParticipant`) immediately; dead ends are retried.
    pub fn run<R: RandomSource + ?Sized>(
        &self,
        participants: &[Participant],
        rng: &mut R,
    ) -> Result<MatchOutcome> {
        let mut attempts: u64 = 0;
        loop {
            attempts += 1;
            self.total_attempts.fetch_add(1, Ordering::Relaxed);
            match attempt(participants, rng) {
                Ok(matching) => {
                    self.total_runs.fetch_add(1, Ordering::Relaxed);
                    tracing::info!(
                        participants = participants.len(),
                        attempts,
                        "Matching complete"
                    );
                    return Ok(MatchOutcome { matching, attempts });
                }
                Err(GiftswapError::DeadEnd { giver }) => {
                    tracing::debug!(attempt = attempts, giver = %giver, "Matching dead end, retrying");
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Attempts made across every run of this driver.
    #[must_use]
    pub fn total_attempts(&self) -> u64 {
        self.total_attempts.load(Ordering::Relaxed)
    }

    /// Successful runs of this driver.
    #[must_use]
    pub fn total_runs(&self) -> u64 {
        self.total_runs.load(Ordering::Relaxed)
    }
}
