//! Typed notification payloads handed to the notification gateway.
//!
//! The engine never renders text for participants; a gateway turns these
//! payloads into whatever message format its platform uses.

use serde::{Deserialize, Serialize};

use crate::{Match, RoundId};

/// A channel-wide broadcast emitted by the end-of-window workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WindowNotice {
    /// The window closed with too few participants to pair anyone.
    InsufficientParticipants { round: RoundId, count: usize },
}

/// The direct message sent to one giver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentNotice {
    pub round: RoundId,
    /// Display name of the person the giver buys for.
    pub receiver_name: String,
    /// Platform handle of the receiver.
    pub receiver_handle: String,
    /// The receiver's extra code (may be empty).
    pub receiver_code: String,
    /// When gifts are exchanged.
    pub gift_date: String,
}

impl AssignmentNotice {
    /// Build the notice for the giver of `pair`.
    #[must_use]
    pub fn for_match(round: RoundId, pair: &Match, gift_date: &str) -> Self {
        Self {
            round,
            receiver_name: pair.receiver.display_name.clone(),
            receiver_handle: pair.receiver.external_handle.clone(),
            receiver_code: pair.receiver.extra_code.clone(),
            gift_date: gift_date.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Participant;

    #[test]
    fn assignment_names_receiver_not_giver() {
        let pair = Match {
            giver: Participant::dummy("ann"),
            receiver: Participant::dummy("bob"),
        };
        let notice = AssignmentNotice::for_match(RoundId::new(), &pair, "24.12.");
        assert_eq!(notice.receiver_name, "BOB");
        assert_eq!(notice.receiver_handle, "@bob");
        assert_eq!(notice.receiver_code, "SW-bob");
        assert_eq!(notice.gift_date, "24.12.");
    }

    #[test]
    fn window_notice_is_tagged() {
        let notice = WindowNotice::InsufficientParticipants {
            round: RoundId::new(),
            count: 1,
        };
        let json = serde_json::to_string(&notice).unwrap();
        assert!(json.contains("\"kind\":\"insufficient_participants\""), "{json}");
    }
}
