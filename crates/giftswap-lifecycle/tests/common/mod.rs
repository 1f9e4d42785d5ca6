//! Shared fixtures for the lifecycle integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use giftswap_lifecycle::{
    AnnouncementStore, LifecycleController, LifecyclePorts, ManualClock,
    MemoryAnnouncementStore, MemoryParticipantStore, MemoryWindowStore, NotificationGateway,
    ParticipantStore, WindowStore,
};
use giftswap_matchcore::RngSource;
use giftswap_types::{
    AssignmentNotice, ChannelRef, Deadline, GiftswapError, LifecycleConfig, Participant,
    ParticipantId, Result, SignupWindow, WindowNotice, constants,
};

pub const TICK: Duration = Duration::from_millis(10);
pub const NOW: &str = "01.12.2025, 12:00:00";
pub const PAST: &str = "01.12.2025, 11:59:59";
pub const FUTURE: &str = "01.12.2025, 12:00:05";

pub fn at(value: &str) -> NaiveDateTime {
    Deadline::parse(value).unwrap().0
}

pub fn open_until(deadline: &str) -> SignupWindow {
    SignupWindow::open(Deadline::parse(deadline).unwrap(), "24.12.2025")
}

/// Let the scheduler run for `ticks` periods.
pub async fn settle(ticks: u32) {
    tokio::time::sleep(TICK * ticks).await;
}

// ---------------------------------------------------------------------------
// RecordingGateway
// ---------------------------------------------------------------------------

/// Gateway double that records every call and fails on demand.
#[derive(Debug, Default)]
pub struct RecordingGateway {
    unresolvable: AtomicBool,
    announcement_gone: AtomicBool,
    failing: Mutex<Vec<ParticipantId>>,
    lookup_delay: Mutex<Option<Duration>>,
    broadcasts: Mutex<Vec<(ChannelRef, WindowNotice)>>,
    sent: Mutex<Vec<(ParticipantId, AssignmentNotice)>>,
    deleted: Mutex<Vec<String>>,
}

impl RecordingGateway {
    pub fn set_unresolvable(&self) {
        self.unresolvable.store(true, Ordering::SeqCst);
    }

    pub fn set_announcement_gone(&self) {
        self.announcement_gone.store(true, Ordering::SeqCst);
    }

    pub fn fail_for(&self, id: &str) {
        self.failing.lock().unwrap().push(ParticipantId::from(id));
    }

    pub fn delay_lookups(&self, by: Duration) {
        *self.lookup_delay.lock().unwrap() = Some(by);
    }

    pub fn broadcasts(&self) -> Vec<(ChannelRef, WindowNotice)> {
        self.broadcasts.lock().unwrap().clone()
    }

    pub fn sent(&self) -> Vec<(ParticipantId, AssignmentNotice)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationGateway for RecordingGateway {
    async fn resolve_channel(&self, channel: &str) -> Result<Option<ChannelRef>> {
        let delay = *self.lookup_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.unresolvable.load(Ordering::SeqCst) {
            return Ok(None);
        }
        Ok(Some(ChannelRef::new(channel)))
    }

    async fn broadcast(&self, channel: &ChannelRef, notice: &WindowNotice) -> Result<()> {
        self.broadcasts
            .lock()
            .unwrap()
            .push((channel.clone(), notice.clone()));
        Ok(())
    }

    async fn send_direct(&self, recipient: &ParticipantId, notice: &AssignmentNotice) -> Result<()> {
        if self.failing.lock().unwrap().contains(recipient) {
            return Err(GiftswapError::Gateway {
                reason: format!("{recipient} does not accept direct messages"),
            });
        }
        self.sent
            .lock()
            .unwrap()
            .push((recipient.clone(), notice.clone()));
        Ok(())
    }

    async fn delete_announcement(&self, _channel: &ChannelRef, message_id: &str) -> Result<()> {
        if self.announcement_gone.load(Ordering::SeqCst) {
            return Err(GiftswapError::AnnouncementNotFound {
                message_id: message_id.to_string(),
            });
        }
        self.deleted.lock().unwrap().push(message_id.to_string());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// FlakyWindowStore
// ---------------------------------------------------------------------------

/// Window store whose first `n` loads fail, optionally with slow saves.
#[derive(Debug)]
pub struct FlakyWindowStore {
    inner: Arc<MemoryWindowStore>,
    failures_left: AtomicUsize,
    save_delay: Option<Duration>,
}

impl FlakyWindowStore {
    pub fn new(inner: Arc<MemoryWindowStore>, failures: usize) -> Self {
        Self {
            inner,
            failures_left: AtomicUsize::new(failures),
            save_delay: None,
        }
    }

    pub fn with_save_delay(mut self, delay: Duration) -> Self {
        self.save_delay = Some(delay);
        self
    }
}

#[async_trait]
impl WindowStore for FlakyWindowStore {
    async fn load(&self) -> Result<SignupWindow> {
        let failing = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(GiftswapError::Storage {
                reason: "window table locked".into(),
            });
        }
        self.inner.load().await
    }

    async fn save(&self, window: &SignupWindow) -> Result<()> {
        if let Some(delay) = self.save_delay {
            tokio::time::sleep(delay).await;
        }
        self.inner.save(window).await
    }
}

// ---------------------------------------------------------------------------
// FixedParticipantStore
// ---------------------------------------------------------------------------

/// Participant store returning a fixed row set (duplicates included), or
/// failing every read when built with [`FixedParticipantStore::failing`].
#[derive(Debug)]
pub struct FixedParticipantStore {
    rows: Option<Vec<Participant>>,
    reads: AtomicUsize,
}

impl FixedParticipantStore {
    pub fn new(rows: Vec<Participant>) -> Self {
        Self {
            rows: Some(rows),
            reads: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            rows: None,
            reads: AtomicUsize::new(0),
        }
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ParticipantStore for FixedParticipantStore {
    async fn participants(&self) -> Result<Vec<Participant>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.rows.clone().ok_or_else(|| GiftswapError::Storage {
            reason: "participant table unavailable".into(),
        })
    }
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

pub struct Harness {
    pub windows: Arc<MemoryWindowStore>,
    pub participants: Arc<MemoryParticipantStore>,
    pub announcements: Arc<MemoryAnnouncementStore>,
    pub gateway: Arc<RecordingGateway>,
    pub clock: Arc<ManualClock>,
}

impl Harness {
    pub fn new(window: SignupWindow, participants: Vec<Participant>) -> Self {
        Self {
            windows: Arc::new(MemoryWindowStore::with_window(window)),
            participants: Arc::new(MemoryParticipantStore::with_participants(participants)),
            announcements: Arc::new(MemoryAnnouncementStore::new()),
            gateway: Arc::new(RecordingGateway::default()),
            clock: Arc::new(ManualClock::new(at(NOW))),
        }
    }

    pub async fn with_announcement(self, message_id: &str) -> Self {
        self.announcements
            .set_value(constants::DEFAULT_ANNOUNCEMENT_KEY, message_id)
            .await
            .unwrap();
        self
    }

    pub fn ports(&self) -> LifecyclePorts {
        LifecyclePorts {
            windows: self.windows.clone(),
            participants: self.participants.clone(),
            announcements: self.announcements.clone(),
            gateway: self.gateway.clone(),
            clock: self.clock.clone(),
        }
    }

    pub fn controller(&self) -> Arc<LifecycleController> {
        Self::build(self.ports())
    }

    pub fn build(ports: LifecyclePorts) -> Arc<LifecycleController> {
        let config = LifecycleConfig::default().with_tick_interval(TICK);
        LifecycleController::new(config, ports, RngSource::seeded(7)).unwrap()
    }

    pub async fn announcement_handle(&self) -> Option<String> {
        self.announcements
            .get_value(constants::DEFAULT_ANNOUNCEMENT_KEY)
            .await
            .unwrap()
    }
}
