//! Fixed-period deadline scheduler.
//!
//! One spawned tokio task per running scheduler, driven by
//! `tokio::time::interval`. Stopping cancels a [`CancellationToken`] instead
//! of aborting the task, so a tick that is already running (possibly the one
//! that called `stop`) always runs to completion and the loop exits before
//! the next tick.
//!
//! ```text
//! start() ──▶ tick ──▶ on_tick().await ──▶ tick ──▶ ... ──▶ stop() ──▶ exit
//! ```

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

struct Running {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

/// A single restartable periodic timer.
#[derive(Default)]
pub struct Scheduler {
    running: Mutex<Option<Running>>,
    ticks: Arc<AtomicU64>,
}

impl Scheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start ticking every `period`, replacing any timer already running.
    ///
    /// The first tick fires immediately. A tick handler is awaited before
    /// the next tick is considered; ticks missed while it runs are skipped.
    /// Must be called from within a tokio runtime.
    ///
    /// # Panics
    /// Panics if `period` is zero.
    pub fn start<F, Fut>(&self, period: Duration, on_tick: F)
    where
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.start_after(Duration::ZERO, period, on_tick);
    }

    /// Like [`start`](Self::start), but the first tick fires after `delay`.
    pub fn start_after<F, Fut>(&self, delay: Duration, period: Duration, on_tick: F)
    where
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let mut slot = self.slot();
        if let Some(previous) = slot.take() {
            previous.token.cancel();
        }

        let token = CancellationToken::new();
        let cancelled = token.clone();
        let ticks = Arc::clone(&self.ticks);

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + delay, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    biased;
                    () = cancelled.cancelled() => break,
                    _ = interval.tick() => {
                        ticks.fetch_add(1, Ordering::Relaxed);
                        on_tick().await;
                    }
                }
            }
            tracing::debug!("Scheduler loop exited");
        });

        tracing::debug!(delay = ?delay, period = ?period, "Scheduler started");
        *slot = Some(Running { token, handle });
    }

    /// Stop the timer. Idempotent; returns whether a timer was running.
    ///
    /// Safe to call from inside a tick handler: the handler keeps running,
    /// only future ticks are cancelled.
    pub fn stop(&self) -> bool {
        match self.slot().take() {
            Some(running) => {
                running.token.cancel();
                tracing::debug!("Scheduler stopped");
                true
            }
            None => false,
        }
    }

    /// Whether a timer is armed and its task still alive.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.slot()
            .as_ref()
            .is_some_and(|r| !r.token.is_cancelled() && !r.handle.is_finished())
    }

    /// Ticks fired since this scheduler was created.
    #[must_use]
    pub fn tick_count(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    fn slot(&self) -> MutexGuard<'_, Option<Running>> {
        self.running.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("running", &self.is_running())
            .field("ticks", &self.tick_count())
            .finish()
    }
}
