//! Signup window lifecycle types.
//!
//! A window cycles through three non-overlapping phases:
//! **INACTIVE → ACTIVE → ENDING → INACTIVE**
//!
//! During ACTIVE, participants opt in and the scheduler ticks.
//! During ENDING, the end-of-window workflow runs (cleanup, pairing,
//! notification). ENDING is never persisted: a crash mid-run resumes as
//! ACTIVE and the deadline check ends the window again.

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::{GiftswapError, Result, constants};

/// The phases of a signup window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WindowPhase {
    /// No window is open; nothing is scheduled.
    Inactive,
    /// A window is open and the deadline scheduler is ticking.
    Active,
    /// The end-of-window workflow is running.
    Ending,
}

impl fmt::Display for WindowPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inactive => write!(f, "INACTIVE"),
            Self::Active => write!(f, "ACTIVE"),
            Self::Ending => write!(f, "ENDING"),
        }
    }
}

// ---------------------------------------------------------------------------
// Deadline
// ---------------------------------------------------------------------------

/// A parsed `DD.MM.YYYY, HH:mm:ss` deadline.
///
/// Wall-clock time in whatever zone the engine's clock reports; no offset is
/// stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Deadline(pub NaiveDateTime);

impl Deadline {
    /// Strictly parse a persisted deadline string.
    ///
    /// The layout is checked byte by byte before `chrono` validates ranges,
    /// so unpadded or otherwise loose variants that `chrono` would accept are
    /// rejected.
    ///
    /// # Errors
    /// Returns `MalformedDeadline` on any deviation from the fixed layout or
    /// an impossible calendar value.
    pub fn parse(value: &str) -> Result<Self> {
        let malformed = || GiftswapError::MalformedDeadline {
            value: value.to_string(),
        };
        if !has_deadline_layout(value) {
            return Err(malformed());
        }
        NaiveDateTime::parse_from_str(value, constants::DEADLINE_FORMAT)
            .map(Self)
            .map_err(|_| malformed())
    }

    /// Whether `now` is strictly past the deadline.
    #[must_use]
    pub fn has_passed(&self, now: NaiveDateTime) -> bool {
        now > self.0
    }
}

impl From<NaiveDateTime> for Deadline {
    fn from(at: NaiveDateTime) -> Self {
        Self(at)
    }
}

impl fmt::Display for Deadline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(constants::DEADLINE_FORMAT))
    }
}

fn has_deadline_layout(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() == constants::DEADLINE_LEN
        && bytes.iter().enumerate().all(|(i, b)| match i {
            2 | 5 => *b == b'.',
            10 => *b == b',',
            11 => *b == b' ',
            14 | 17 => *b == b':',
            _ => b.is_ascii_digit(),
        })
}

// ---------------------------------------------------------------------------
// SignupWindow: the persisted singleton
// ---------------------------------------------------------------------------

/// The persisted signup-window record.
///
/// The three fields are always written together as one record. When
/// `active` is false both `deadline` and `gift_date` are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SignupWindow {
    pub active: bool,
    pub deadline: Option<String>,
    pub gift_date: Option<String>,
}

impl SignupWindow {
    /// The cleared record.
    #[must_use]
    pub fn inactive() -> Self {
        Self::default()
    }

    /// An active record closing at `deadline`.
    #[must_use]
    pub fn open(deadline: Deadline, gift_date: impl Into<String>) -> Self {
        Self {
            active: true,
            deadline: Some(deadline.to_string()),
            gift_date: Some(gift_date.into()),
        }
    }

    /// Parse the stored deadline.
    ///
    /// # Errors
    /// `MalformedDeadline` if the window is active and the deadline is
    /// missing or fails the strict layout check.
    pub fn parsed_deadline(&self) -> Result<Option<Deadline>> {
        if !self.active {
            return Ok(None);
        }
        match self.deadline.as_deref() {
            Some(raw) => Deadline::parse(raw).map(Some),
            None => Err(GiftswapError::MalformedDeadline {
                value: String::new(),
            }),
        }
    }

    /// The gift date, if present and not blank.
    #[must_use]
    pub fn gift_date(&self) -> Option<&str> {
        self.gift_date
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
    }

    /// The persisted phase this record represents.
    #[must_use]
    pub fn phase(&self) -> WindowPhase {
        if self.active {
            WindowPhase::Active
        } else {
            WindowPhase::Inactive
        }
    }

    /// Whether the record satisfies the inactive-means-cleared invariant.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.active || (self.deadline.is_none() && self.gift_date.is_none())
    }
}
