//! Pairing types produced by the matcher.
//!
//! A [`Match`] is one giver → receiver assignment. A [`Matching`] is the full
//! set produced by one successful attempt. Both are ephemeral: they live only
//! for the duration of one end-of-window run and are never persisted.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Participant, ParticipantId};

/// A single gift assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    /// The participant who buys the gift.
    pub giver: Participant,
    /// The participant who receives it.
    pub receiver: Participant,
}

impl Match {
    /// Returns `true` if the giver was assigned to themselves.
    #[must_use]
    pub fn is_self_assignment(&self) -> bool {
        self.giver.id == self.receiver.id
    }
}

impl fmt::Display for Match {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.giver.id, self.receiver.id)
    }
}

/// The complete assignment of one successful matching attempt, in giver
/// order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Matching {
    pub matches: Vec<Match>,
}

impl Matching {
    #[must_use]
    pub fn new(matches: Vec<Match>) -> Self {
        Self { matches }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.matches.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Match> {
        self.matches.iter()
    }

    /// The receiver assigned to `giver`, if any.
    #[must_use]
    pub fn receiver_of(&self, giver: &ParticipantId) -> Option<&Participant> {
        self.matches
            .iter()
            .find(|m| &m.giver.id == giver)
            .map(|m| &m.receiver)
    }
}

impl IntoIterator for Matching {
    type Item = Match;
    type IntoIter = std::vec::IntoIter<Match>;

    fn into_iter(self) -> Self::IntoIter {
        self.matches.into_iter()
    }
}

impl<'a> IntoIterator for &'a Matching {
    type Item = &'a Match;
    type IntoIter = std::slice::Iter<'a, Match>;

    fn into_iter(self) -> Self::IntoIter {
        self.matches.iter()
    }
}
