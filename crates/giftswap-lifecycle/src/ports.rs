//! Collaborator ports consumed by the lifecycle controller.
//!
//! Storage and delivery live outside this crate. Each port is an object-safe
//! async trait so a controller can be wired with any mix of backends
//! (in-memory for tests, a JSON file, a database, a chat platform).

use async_trait::async_trait;
use chrono::{Local, NaiveDateTime};
use giftswap_types::{
    AssignmentNotice, ChannelRef, Participant, ParticipantId, Result, SignupWindow, WindowNotice,
};

/// Persistence of the singleton signup-window record.
#[async_trait]
pub trait WindowStore: Send + Sync {
    /// Load the record. A store that has never been written returns
    /// [`SignupWindow::inactive`].
    async fn load(&self) -> Result<SignupWindow>;

    /// Replace the whole record in one write.
    async fn save(&self, window: &SignupWindow) -> Result<()>;
}

/// Read access to the participant registry.
#[async_trait]
pub trait ParticipantStore: Send + Sync {
    /// Rows with `participates == true`, in a stable order.
    async fn participants(&self) -> Result<Vec<Participant>>;
}

/// Generic key → external-message-id mapping.
#[async_trait]
pub trait AnnouncementStore: Send + Sync {
    async fn get_value(&self, key: &str) -> Result<Option<String>>;
    async fn set_value(&self, key: &str, value: &str) -> Result<()>;
    async fn clear(&self, key: &str) -> Result<()>;
}

/// Outbound delivery to the chat platform.
///
/// Every method may fail. The controller logs failures and carries on,
/// except for channel resolution which aborts the end-of-window run.
#[async_trait]
pub trait NotificationGateway: Send + Sync {
    /// Look up the announcement channel by its configured name.
    async fn resolve_channel(&self, channel: &str) -> Result<Option<ChannelRef>>;

    async fn broadcast(&self, channel: &ChannelRef, notice: &WindowNotice) -> Result<()>;

    async fn send_direct(&self, recipient: &ParticipantId, notice: &AssignmentNotice)
    -> Result<()>;

    /// Delete a prior message. A message that is already gone should be
    /// reported as `AnnouncementNotFound`.
    async fn delete_announcement(&self, channel: &ChannelRef, message_id: &str) -> Result<()>;
}

/// Wall-clock source, in the zone deadlines are written in.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// The host's local time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_clock_advances() {
        let clock = SystemClock;
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }
}
