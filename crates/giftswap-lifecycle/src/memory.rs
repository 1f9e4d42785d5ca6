//! In-memory implementations of the storage ports.
//!
//! Suitable for tests and for single-process embedding where durability is
//! handled elsewhere. All state sits behind `std::sync::Mutex`; no lock is
//! ever held across an `.await`.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{NaiveDateTime, TimeDelta};
use giftswap_types::{GiftswapError, Participant, ParticipantId, Result, SignupWindow};

use crate::ports::{AnnouncementStore, Clock, ParticipantStore, WindowStore};

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

// ---------------------------------------------------------------------------
// MemoryWindowStore
// ---------------------------------------------------------------------------

/// Signup-window record held in memory.
#[derive(Debug, Default)]
pub struct MemoryWindowStore {
    window: Mutex<SignupWindow>,
    saves: Mutex<usize>,
}

impl MemoryWindowStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `window`, as if written by a previous process.
    #[must_use]
    pub fn with_window(window: SignupWindow) -> Self {
        Self {
            window: Mutex::new(window),
            saves: Mutex::new(0),
        }
    }

    /// Current record.
    #[must_use]
    pub fn snapshot(&self) -> SignupWindow {
        lock(&self.window).clone()
    }

    /// Number of `save` calls served.
    #[must_use]
    pub fn save_count(&self) -> usize {
        *lock(&self.saves)
    }
}

#[async_trait]
impl WindowStore for MemoryWindowStore {
    async fn load(&self) -> Result<SignupWindow> {
        Ok(self.snapshot())
    }

    async fn save(&self, window: &SignupWindow) -> Result<()> {
        *lock(&self.window) = window.clone();
        *lock(&self.saves) += 1;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// MemoryParticipantStore
// ---------------------------------------------------------------------------

/// Participant registry in registration order.
#[derive(Debug, Default)]
pub struct MemoryParticipantStore {
    rows: Mutex<Vec<Participant>>,
}

impl MemoryParticipantStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_participants(rows: impl IntoIterator<Item = Participant>) -> Self {
        let store = Self::new();
        for row in rows {
            store.upsert(row);
        }
        store
    }

    /// Insert a row, or replace the row with the same id in place.
    pub fn upsert(&self, participant: Participant) {
        let mut rows = lock(&self.rows);
        match rows.iter_mut().find(|p| p.id == participant.id) {
            Some(existing) => *existing = participant,
            None => rows.push(participant),
        }
    }

    /// Remove a row; returns it if it existed.
    pub fn remove(&self, id: &ParticipantId) -> Option<Participant> {
        let mut rows = lock(&self.rows);
        let idx = rows.iter().position(|p| &p.id == id)?;
        Some(rows.remove(idx))
    }

    #[must_use]
    pub fn get(&self, id: &ParticipantId) -> Option<Participant> {
        lock(&self.rows).iter().find(|p| &p.id == id).cloned()
    }

    /// Set the opt-in flag of one participant.
    ///
    /// # Errors
    /// `ParticipantNotFound` for an unknown id.
    pub fn set_participation(&self, id: &ParticipantId, participates: bool) -> Result<()> {
        let mut rows = lock(&self.rows);
        let row = rows
            .iter_mut()
            .find(|p| &p.id == id)
            .ok_or_else(|| GiftswapError::ParticipantNotFound(id.clone()))?;
        row.participates = participates;
        Ok(())
    }

    /// Clear every opt-in flag, as done before a new window opens.
    pub fn reset_participation(&self) {
        for row in lock(&self.rows).iter_mut() {
            row.participates = false;
        }
    }

    /// All rows, opted in or not.
    #[must_use]
    pub fn all(&self) -> Vec<Participant> {
        lock(&self.rows).clone()
    }
}

#[async_trait]
impl ParticipantStore for MemoryParticipantStore {
    async fn participants(&self) -> Result<Vec<Participant>> {
        Ok(lock(&self.rows)
            .iter()
            .filter(|p| p.participates)
            .cloned()
            .collect())
    }
}

// ---------------------------------------------------------------------------
// MemoryAnnouncementStore
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct MemoryAnnouncementStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryAnnouncementStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AnnouncementStore for MemoryAnnouncementStore {
    async fn get_value(&self, key: &str) -> Result<Option<String>> {
        Ok(lock(&self.values).get(key).cloned())
    }

    async fn set_value(&self, key: &str, value: &str) -> Result<()> {
        lock(&self.values).insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn clear(&self, key: &str) -> Result<()> {
        lock(&self.values).remove(key);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// ManualClock
// ---------------------------------------------------------------------------

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<NaiveDateTime>,
}

impl ManualClock {
    #[must_use]
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: NaiveDateTime) {
        *lock(&self.now) = now;
    }

    pub fn advance(&self, by: TimeDelta) {
        let mut now = lock(&self.now);
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> NaiveDateTime {
        *lock(&self.now)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use giftswap_types::Deadline;

    use super::*;

    #[tokio::test]
    async fn window_store_roundtrip() {
        let store = MemoryWindowStore::new();
        assert_eq!(store.load().await.unwrap(), SignupWindow::inactive());

        let deadline = Deadline::parse("01.12.2025, 20:00:00").unwrap();
        let open = SignupWindow::open(deadline, "24.12.2025");
        store.save(&open).await.unwrap();
        assert_eq!(store.load().await.unwrap(), open);
        assert_eq!(store.save_count(), 1);
    }

    #[tokio::test]
    async fn only_opted_in_rows_are_returned() {
        let store = MemoryParticipantStore::with_participants([
            Participant::dummy("a"),
            Participant::new("b", "B", "@b", ""),
            Participant::dummy("c"),
        ]);
        let ids: Vec<String> = store
            .participants()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.id.0)
            .collect();
        assert_eq!(ids, ["a", "c"]);
    }

    #[tokio::test]
    async fn participation_flags() {
        let store = MemoryParticipantStore::with_participants(Participant::dummies(3));
        store.reset_participation();
        assert!(store.participants().await.unwrap().is_empty());

        store
            .set_participation(&ParticipantId::from("p1"), true)
            .unwrap();
        assert_eq!(store.participants().await.unwrap().len(), 1);

        let err = store
            .set_participation(&ParticipantId::from("nobody"), true)
            .unwrap_err();
        assert!(matches!(err, GiftswapError::ParticipantNotFound(_)));
    }

    #[test]
    fn upsert_replaces_in_place() {
        let store = MemoryParticipantStore::with_participants(Participant::dummies(2));
        let mut renamed = Participant::dummy("p0");
        renamed.display_name = "Renamed".into();
        store.upsert(renamed);

        let all = store.all();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].display_name, "Renamed");

        assert!(store.remove(&ParticipantId::from("p0")).is_some());
        assert!(store.get(&ParticipantId::from("p0")).is_none());
    }

    #[tokio::test]
    async fn announcement_store_set_get_clear() {
        let store = MemoryAnnouncementStore::new();
        assert_eq!(store.get_value("k").await.unwrap(), None);
        store.set_value("k", "msg-1").await.unwrap();
        assert_eq!(store.get_value("k").await.unwrap().as_deref(), Some("msg-1"));
        store.clear("k").await.unwrap();
        assert_eq!(store.get_value("k").await.unwrap(), None);
    }

    #[test]
    fn manual_clock_moves_on_demand() {
        let start = NaiveDate::from_ymd_opt(2025, 12, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let clock = ManualClock::new(start);
        assert_eq!(clock.now(), start);
        clock.advance(TimeDelta::seconds(90));
        assert_eq!(clock.now(), start + TimeDelta::seconds(90));
    }
}
