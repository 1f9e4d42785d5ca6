//! # giftswap-matchcore
//!
//! **Randomized pairing engine for Giftswap.**
//!
//! MatchCore is the compute plane. It takes a participant set and produces a
//! gift-exchange assignment, with:
//!
//! - **Zero side effects**: no storage, no notifications, no clock
//! - **Derangement output**: a permutation where nobody draws themselves
//! - **Injectable randomness**: every draw comes from a [`RandomSource`]
//! - **Rejection sampling**: greedy attempts retried until one succeeds

pub mod matcher;
pub mod random;
pub mod retry;
pub mod verify;

pub use matcher::attempt;
#[cfg(any(test, feature = "test-helpers"))]
pub use random::ScriptedSource;
pub use random::{RandomSource, RngSource};
pub use retry::{MatchOutcome, MatchingRetryDriver};
pub use verify::{assignment_digest, assignment_digest_hex, verify_derangement};
