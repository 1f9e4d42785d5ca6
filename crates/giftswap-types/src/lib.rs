//! # giftswap-types
//!
//! Shared types, errors, and configuration for the **Giftswap** engine.
//!
//! This crate is the leaf dependency of the workspace; every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`ParticipantId`], [`ChannelRef`], [`RoundId`]
//! - **Participant model**: [`Participant`], [`validate_pool`]
//! - **Window model**: [`SignupWindow`], [`Deadline`], [`WindowPhase`]
//! - **Pairing model**: [`Match`], [`Matching`]
//! - **Notification payloads**: [`WindowNotice`], [`AssignmentNotice`]
//! - **Configuration**: [`LifecycleConfig`]
//! - **Errors**: [`GiftswapError`] with `GS_ERR_` prefix codes
//! - **Constants**: system-wide limits and defaults

pub mod config;
pub mod constants;
pub mod error;
pub mod ids;
pub mod notice;
pub mod pairing;
pub mod participant;
pub mod window;

// Re-export all primary types at crate root for ergonomic imports:
//   use giftswap_types::{Participant, SignupWindow, Matching, ...};

pub use config::*;
pub use error::*;
pub use ids::*;
pub use notice::*;
pub use pairing::*;
pub use participant::*;
pub use window::*;

// Constants are accessed via `giftswap_types::constants::FOO`
// (not re-exported to avoid name collisions).
