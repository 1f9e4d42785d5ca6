//! Participant registry rows.
//!
//! A participant is a durable registry row. The `participates` flag is a soft
//! opt-in marker: the registry resets it in bulk before a new window opens and
//! sets it when a user signs up. Only flagged rows ever reach the matcher.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{GiftswapError, ParticipantId, Result, constants};

/// One registered gift-exchange participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// External platform user id (registry key).
    pub id: ParticipantId,
    /// Name shown to the giver.
    pub display_name: String,
    /// Platform handle used to reach the receiver (e.g. `@name`).
    pub external_handle: String,
    /// Free-form code the receiver shares with their giver (e.g. a friend code).
    pub extra_code: String,
    /// Whether this participant opted into the current window.
    pub participates: bool,
}

impl Participant {
    #[must_use]
    pub fn new(
        id: impl Into<ParticipantId>,
        display_name: impl Into<String>,
        external_handle: impl Into<String>,
        extra_code: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            external_handle: external_handle.into(),
            extra_code: extra_code.into(),
            participates: false,
        }
    }

    /// Builder-style opt-in.
    #[must_use]
    pub fn opted_in(mut self) -> Self {
        self.participates = true;
        self
    }
}

/// Check that a participant set can be paired.
///
/// # Errors
/// - `InsufficientParticipants` when fewer than two participants are given
/// - `DuplicateParticipant` when an id appears more than once
pub fn validate_pool(participants: &[Participant]) -> Result<()> {
    if participants.len() < constants::MIN_PARTICIPANTS {
        return Err(GiftswapError::InsufficientParticipants {
            count: participants.len(),
        });
    }
    let mut seen = HashSet::with_capacity(participants.len());
    for p in participants {
        if !seen.insert(&p.id) {
            return Err(GiftswapError::DuplicateParticipant(p.id.clone()));
        }
    }
    Ok(())
}

#[cfg(any(test, feature = "test-helpers"))]
impl Participant {
    /// An opted-in participant whose every field derives from `name`.
    pub fn dummy(name: &str) -> Self {
        Self::new(
            name,
            name.to_uppercase(),
            format!("@{name}"),
            format!("SW-{name}"),
        )
        .opted_in()
    }

    /// `n` opted-in dummies named `p0`, `p1`, ...
    pub fn dummies(n: usize) -> Vec<Self> {
        (0..n).map(|i| Self::dummy(&format!("p{i}"))).collect()
    }
}
