//! Error types for the Giftswap engine.
//!
//! All errors use the `GS_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Signup window errors
//! - 2xx: Participant errors
//! - 3xx: Matching errors
//! - 4xx: Collaborator (store / gateway) errors
//! - 9xx: General / internal errors

use thiserror::Error;

use crate::{ParticipantId, WindowPhase};

/// Central error enum for all Giftswap operations.
#[derive(Debug, Error)]
pub enum GiftswapError {
    // =================================================================
    // Signup Window Errors (1xx)
    // =================================================================
    /// The persisted deadline does not match `DD.MM.YYYY, HH:mm:ss`.
    #[error("GS_ERR_100: Malformed deadline: {value:?}")]
    MalformedDeadline { value: String },

    /// The window has no gift date to announce to givers.
    #[error("GS_ERR_101: Gift date missing from signup window")]
    MissingGiftDate,

    /// The announcement channel could not be resolved by the gateway.
    #[error("GS_ERR_102: Announcement channel unresolved: {channel}")]
    ChannelUnresolved { channel: String },

    /// There is no active window to end.
    #[error("GS_ERR_103: No active signup window")]
    WindowNotActive,

    /// Another end-of-window run holds the in-progress guard.
    #[error("GS_ERR_104: End of window already in progress")]
    EndInProgress,

    /// An operation was attempted in the wrong lifecycle phase.
    #[error("GS_ERR_105: Wrong window phase: expected {expected}, got {actual}")]
    WrongPhase {
        expected: WindowPhase,
        actual: WindowPhase,
    },

    // =================================================================
    // Participant Errors (2xx)
    // =================================================================
    /// Fewer than two participants; no pairing is possible.
    #[error("GS_ERR_200: Insufficient participants: {count}")]
    InsufficientParticipants { count: usize },

    /// The same participant id appears twice in the input set.
    #[error("GS_ERR_201: Duplicate participant: {0}")]
    DuplicateParticipant(ParticipantId),

    /// The requested participant is not in the registry.
    #[error("GS_ERR_202: Participant not found: {0}")]
    ParticipantNotFound(ParticipantId),

    // =================================================================
    // Matching Errors (3xx)
    // =================================================================
    /// A greedy attempt left a giver with no eligible receiver.
    #[error("GS_ERR_300: Matching dead end at giver {giver}")]
    DeadEnd { giver: ParticipantId },

    /// A produced assignment is not a derangement of its input.
    #[error("GS_ERR_301: Invalid assignment: {reason}")]
    InvalidAssignment { reason: String },

    // =================================================================
    // Collaborator Errors (4xx)
    // =================================================================
    /// The notification gateway rejected or failed a request.
    #[error("GS_ERR_400: Gateway error: {reason}")]
    Gateway { reason: String },

    /// The gateway reported that the message no longer exists.
    #[error("GS_ERR_401: Announcement not found: {message_id}")]
    AnnouncementNotFound { message_id: String },

    /// A persistence backend failed.
    #[error("GS_ERR_402: Storage error: {reason}")]
    Storage { reason: String },

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Unrecoverable internal error.
    #[error("GS_ERR_900: Internal error: {0}")]
    Internal(String),

    /// Serialization / deserialization error.
    #[error("GS_ERR_901: Serialization error: {0}")]
    Serialization(String),

    /// Configuration error (invalid values, missing fields, etc.).
    #[error("GS_ERR_902: Configuration error: {0}")]
    Configuration(String),

    /// I/O error (disk, network).
    #[error("GS_ERR_903: I/O error: {0}")]
    Io(String),
}

impl GiftswapError {
    /// Human-readable outcome text for the caller of an end-of-window run.
    ///
    /// Each abort cause gets its own sentence; collaborator and internal
    /// failures collapse into a generic one.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::MalformedDeadline { .. } => {
                "The signup deadline is malformed; the signup window was closed.".to_string()
            }
            Self::MissingGiftDate => {
                "No gift date was set; the signup window was closed without pairing.".to_string()
            }
            Self::ChannelUnresolved { channel } => format!(
                "The announcement channel \"{channel}\" could not be found; the signup window was closed."
            ),
            Self::WindowNotActive => "There is no active signup window to end.".to_string(),
            Self::EndInProgress => "The signup window is already being closed.".to_string(),
            Self::InsufficientParticipants { count } => format!(
                "The signup window closed with {count} participant(s); at least two are needed."
            ),
            _ => format!("Ending the signup window failed: {self}"),
        }
    }

    /// Whether this error aborts an end-of-window run before pairing.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::MalformedDeadline { .. } | Self::MissingGiftDate | Self::ChannelUnresolved { .. }
        )
    }

    /// Whether an end-of-window run failing with this error must close the
    /// window instead of retrying. Covers validation failures plus
    /// participant-data faults no retry can clear.
    #[must_use]
    pub fn is_abort(&self) -> bool {
        self.is_validation()
            || matches!(
                self,
                Self::InsufficientParticipants { .. }
                    | Self::DuplicateParticipant(_)
                    | Self::InvalidAssignment { .. }
            )
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, GiftswapError>;

impl From<std::io::Error> for GiftswapError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for GiftswapError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
