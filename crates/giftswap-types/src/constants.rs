//! System-wide constants for the Giftswap engine.

/// Default scheduler tick period in milliseconds.
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 1000;

/// Minimum number of participants required to produce a pairing.
pub const MIN_PARTICIPANTS: usize = 2;

/// `chrono` format string for persisted deadlines (`DD.MM.YYYY, HH:mm:ss`).
pub const DEADLINE_FORMAT: &str = "%d.%m.%Y, %H:%M:%S";

/// Exact byte length of a well-formed deadline string.
pub const DEADLINE_LEN: usize = 20;

/// Default announcement-handle key for the signup announcement message.
pub const DEFAULT_ANNOUNCEMENT_KEY: &str = "signup_announcement";

/// Default announcement channel name.
pub const DEFAULT_ANNOUNCEMENT_CHANNEL: &str = "gift-exchange";

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "Giftswap";
