//! Configuration for the lifecycle controller.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{GiftswapError, Result, constants};

/// Runtime configuration of one lifecycle controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LifecycleConfig {
    /// Period of the deadline scheduler.
    pub tick_interval: Duration,
    /// Channel the signup announcement lives in (resolved by the gateway).
    pub announcement_channel: String,
    /// Announcement-handle key under which the announcement message id is stored.
    pub announcement_key: String,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(constants::DEFAULT_TICK_INTERVAL_MS),
            announcement_channel: constants::DEFAULT_ANNOUNCEMENT_CHANNEL.to_string(),
            announcement_key: constants::DEFAULT_ANNOUNCEMENT_KEY.to_string(),
        }
    }
}

impl LifecycleConfig {
    /// Reject values the controller cannot run with.
    ///
    /// # Errors
    /// `Configuration` for a zero tick interval or a blank channel or key.
    pub fn validate(&self) -> Result<()> {
        if self.tick_interval.is_zero() {
            return Err(GiftswapError::Configuration(
                "tick_interval must be > 0".to_string(),
            ));
        }
        if self.announcement_channel.trim().is_empty() {
            return Err(GiftswapError::Configuration(
                "announcement_channel must not be blank".to_string(),
            ));
        }
        if self.announcement_key.trim().is_empty() {
            return Err(GiftswapError::Configuration(
                "announcement_key must not be blank".to_string(),
            ));
        }
        Ok(())
    }

    /// Same config with a different tick period.
    #[must_use]
    pub fn with_tick_interval(mut self, tick_interval: Duration) -> Self {
        self.tick_interval = tick_interval;
        self
    }
}
