//! Signup-window lifecycle controller.
//!
//! Owns the window phase, the deadline [`Scheduler`] and the end-of-window
//! workflow:
//!
//! ```text
//! resume() ──▶ ACTIVE ──tick: now > deadline──▶ ENDING ──▶ INACTIVE
//!                 │                               ▲
//!                 └──────── end_window() ─────────┘
//! ```
//!
//! ## End-of-window workflow
//!
//! 0. Take the run guard, stop the scheduler
//! 1. Load the window and the opted-in participants
//! 2. Resolve the announcement channel (abort if unresolved)
//! 3. Require a gift date (abort if missing)
//! 4. Delete the prior announcement, clear its handle
//! 5. Fewer than two participants: broadcast and skip pairing.
//!    Otherwise pair them and send each giver a direct notice
//! 6. Reset the persisted window to inactive
//!
//! The pool is checked for duplicate ids between steps 3 and 4. Every abort
//! (2, 3, malformed deadline, bad participant data) also resets the window,
//! so no abort path leaves a window that ticks forever. A storage failure
//! in step 1 happens before any side effect; it leaves the window active and
//! re-arms the scheduler one full period later.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use giftswap_matchcore::{
    MatchingRetryDriver, RandomSource, assignment_digest_hex, verify_derangement,
};
use giftswap_types::{
    AssignmentNotice, ChannelRef, GiftswapError, LifecycleConfig, Matching, Participant, Result,
    RoundId, SignupWindow, WindowNotice, WindowPhase, constants, validate_pool,
};
use tokio::task::JoinSet;

use crate::ports::{AnnouncementStore, Clock, NotificationGateway, ParticipantStore, WindowStore};
use crate::run_guard::RunGuard;
use crate::scheduler::Scheduler;

/// The collaborators a controller is wired with.
#[derive(Clone)]
pub struct LifecyclePorts {
    pub windows: Arc<dyn WindowStore>,
    pub participants: Arc<dyn ParticipantStore>,
    pub announcements: Arc<dyn AnnouncementStore>,
    pub gateway: Arc<dyn NotificationGateway>,
    pub clock: Arc<dyn Clock>,
}

/// How a completed end-of-window run finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndOutcome {
    /// Everyone was paired; `delivered + failed == pairs`.
    Paired {
        round: RoundId,
        pairs: usize,
        attempts: u64,
        delivered: usize,
        failed: usize,
    },
    /// Too few participants; nobody was paired.
    InsufficientParticipants { round: RoundId, count: usize },
}

impl EndOutcome {
    #[must_use]
    pub fn round(&self) -> RoundId {
        match self {
            Self::Paired { round, .. } | Self::InsufficientParticipants { round, .. } => *round,
        }
    }
}

impl fmt::Display for EndOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Paired {
                pairs, failed: 0, ..
            } => write!(
                f,
                "The signup window is closed: {pairs} participants were paired and notified."
            ),
            Self::Paired { pairs, failed, .. } => write!(
                f,
                "The signup window is closed: {pairs} participants were paired; \
                 {failed} notification(s) could not be delivered."
            ),
            Self::InsufficientParticipants { count, .. } => f.write_str(
                &GiftswapError::InsufficientParticipants { count: *count }.user_message(),
            ),
        }
    }
}

/// What a single scheduler tick did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// Deadline not reached yet.
    Pending,
    /// The persisted window is inactive; the scheduler was stopped.
    NotActive,
    /// Another end-of-window run holds the guard; nothing was done.
    Busy,
    /// The window could not be read; the next tick retries.
    StoreUnavailable,
    /// The deadline failed the format check; the window was reset.
    MalformedDeadline,
    /// The deadline passed and the window was ended with this message.
    Ended { message: String },
}

/// Drives one signup window from resume to reset.
///
/// Always used behind an `Arc`: the scheduler task holds a `Weak` back
/// reference, so dropping the last `Arc` stops ticking.
pub struct LifecycleController {
    config: LifecycleConfig,
    ports: LifecyclePorts,
    rng: Mutex<Box<dyn RandomSource + Send>>,
    driver: MatchingRetryDriver,
    scheduler: Scheduler,
    run_guard: RunGuard,
    phase: Mutex<WindowPhase>,
}

impl LifecycleController {
    /// Build a controller. Starts in `INACTIVE`; call [`resume`](Self::resume)
    /// to pick up a window persisted by an earlier process.
    ///
    /// # Errors
    /// `Configuration` if `config` fails validation.
    pub fn new(
        config: LifecycleConfig,
        ports: LifecyclePorts,
        rng: impl RandomSource + Send + 'static,
    ) -> Result<Arc<Self>> {
        config.validate()?;
        Ok(Arc::new(Self {
            config,
            ports,
            rng: Mutex::new(Box::new(rng)),
            driver: MatchingRetryDriver::new(),
            scheduler: Scheduler::new(),
            run_guard: RunGuard::new(),
            phase: Mutex::new(WindowPhase::Inactive),
        }))
    }

    // -----------------------------------------------------------------------
    // Entry points
    // -----------------------------------------------------------------------

    /// Re-enter `ACTIVE` and re-arm the scheduler if the persisted window is
    /// active. Returns whether the scheduler was started.
    pub async fn resume(self: &Arc<Self>) -> Result<bool> {
        let window = self.ports.windows.load().await?;
        if !window.active {
            self.set_phase(WindowPhase::Inactive);
            tracing::info!("No active signup window to resume");
            return Ok(false);
        }

        tracing::info!(
            deadline = window.deadline.as_deref().unwrap_or_default(),
            "Resuming active signup window"
        );
        self.set_phase(WindowPhase::Active);
        self.arm_scheduler(Duration::ZERO);
        Ok(true)
    }

    /// Persist a freshly opened window and start the scheduler. This is the
    /// hook the external start trigger calls; an existing window is
    /// overwritten.
    ///
    /// # Errors
    /// - `EndInProgress` while an end-of-window run is active
    /// - `MalformedDeadline` / `MissingGiftDate` for an unusable record
    pub async fn open_window(self: &Arc<Self>, window: SignupWindow) -> Result<()> {
        let Some(_permit) = self.run_guard.try_acquire() else {
            return Err(GiftswapError::EndInProgress);
        };
        if !window.active {
            return Err(GiftswapError::WrongPhase {
                expected: WindowPhase::Active,
                actual: window.phase(),
            });
        }
        window.parsed_deadline()?;
        if window.gift_date().is_none() {
            return Err(GiftswapError::MissingGiftDate);
        }

        self.ports.windows.save(&window).await?;
        tracing::info!(
            deadline = window.deadline.as_deref().unwrap_or_default(),
            "Signup window opened"
        );
        self.set_phase(WindowPhase::Active);
        self.arm_scheduler(Duration::ZERO);
        Ok(())
    }

    /// One scheduler tick: end the window if its deadline has passed.
    pub async fn check_deadline(self: &Arc<Self>) -> TickOutcome {
        if self.run_guard.is_held() {
            return TickOutcome::Busy;
        }

        let window = match self.ports.windows.load().await {
            Ok(window) => window,
            Err(err) => {
                tracing::warn!(error = %err, "Deadline check could not load signup window");
                return TickOutcome::StoreUnavailable;
            }
        };

        let deadline = match window.parsed_deadline() {
            Ok(Some(deadline)) => deadline,
            Ok(None) => {
                self.scheduler.stop();
                self.set_phase(WindowPhase::Inactive);
                return TickOutcome::NotActive;
            }
            Err(err) => return self.close_malformed(&err).await,
        };

        let now = self.ports.clock.now();
        if !deadline.has_passed(now) {
            tracing::trace!(%deadline, %now, "Signup deadline not reached");
            return TickOutcome::Pending;
        }

        tracing::info!(%deadline, "Signup deadline passed, ending window");
        TickOutcome::Ended {
            message: self.end_now().await,
        }
    }

    /// End the window now and render the result as one human-readable line.
    pub async fn end_now(self: &Arc<Self>) -> String {
        match self.end_window().await {
            Ok(outcome) => outcome.to_string(),
            Err(err) => err.user_message(),
        }
    }

    /// Run the end-of-window workflow (manual or deadline-driven).
    ///
    /// At most one run executes at a time; a concurrent call is refused with
    /// `EndInProgress` and has no side effects.
    pub async fn end_window(self: &Arc<Self>) -> Result<EndOutcome> {
        let Some(_permit) = self.run_guard.try_acquire() else {
            tracing::warn!("End of signup window requested while another run is in progress");
            return Err(GiftswapError::EndInProgress);
        };
        self.scheduler.stop();

        let window = match self.ports.windows.load().await {
            Ok(window) => window,
            Err(err) => {
                self.rearm_after_failure(&err);
                return Err(err);
            }
        };
        if !window.active {
            self.set_phase(WindowPhase::Inactive);
            return Err(GiftswapError::WindowNotActive);
        }

        let round = RoundId::new();
        self.set_phase(WindowPhase::Ending);
        tracing::info!(%round, "Ending signup window");

        let result = self.run_round(round, &window).await;
        match &result {
            Ok(outcome) => {
                tracing::info!(%round, result = %outcome, "Signup window ended");
                self.set_phase(WindowPhase::Inactive);
            }
            Err(err) if err.is_abort() => {
                tracing::warn!(%round, error = %err, "Ending aborted, closing signup window");
                self.reset_window(round).await;
                self.set_phase(WindowPhase::Inactive);
            }
            Err(err) => self.rearm_after_failure(err),
        }
        result
    }

    // -----------------------------------------------------------------------
    // Observability
    // -----------------------------------------------------------------------

    #[must_use]
    pub fn phase(&self) -> WindowPhase {
        *self.phase_slot()
    }

    #[must_use]
    pub fn is_scheduled(&self) -> bool {
        self.scheduler.is_running()
    }

    /// Scheduler ticks fired since construction.
    #[must_use]
    pub fn tick_count(&self) -> u64 {
        self.scheduler.tick_count()
    }

    /// Matching attempts made across all rounds.
    #[must_use]
    pub fn matching_attempts(&self) -> u64 {
        self.driver.total_attempts()
    }

    #[must_use]
    pub fn config(&self) -> &LifecycleConfig {
        &self.config
    }

    // -----------------------------------------------------------------------
    // Workflow steps
    // -----------------------------------------------------------------------

    async fn run_round(&self, round: RoundId, window: &SignupWindow) -> Result<EndOutcome> {
        let participants = self.ports.participants.participants().await?;
        let channel = self.resolve_channel().await?;
        let gift_date = window
            .gift_date()
            .ok_or(GiftswapError::MissingGiftDate)?
            .to_string();
        if participants.len() >= constants::MIN_PARTICIPANTS {
            validate_pool(&participants)?;
        }

        self.retire_announcement(round, &channel).await;

        let outcome = if participants.len() < constants::MIN_PARTICIPANTS {
            self.announce_insufficient(round, &channel, participants.len())
                .await
        } else {
            self.pair_and_notify(round, &participants, &gift_date)
                .await?
        };

        self.reset_window(round).await;
        Ok(outcome)
    }

    async fn resolve_channel(&self) -> Result<ChannelRef> {
        let name = &self.config.announcement_channel;
        let unresolved = || GiftswapError::ChannelUnresolved {
            channel: name.clone(),
        };
        match self.ports.gateway.resolve_channel(name).await {
            Ok(Some(channel)) => Ok(channel),
            Ok(None) => Err(unresolved()),
            Err(err) => {
                tracing::warn!(channel = %name, error = %err, "Channel lookup failed");
                Err(unresolved())
            }
        }
    }

    async fn retire_announcement(&self, round: RoundId, channel: &ChannelRef) {
        let key = &self.config.announcement_key;
        let message_id = match self.ports.announcements.get_value(key).await {
            Ok(Some(id)) if !id.is_empty() => id,
            Ok(_) => {
                tracing::debug!(%round, key = %key, "No announcement handle stored");
                return;
            }
            Err(err) => {
                tracing::warn!(%round, key = %key, error = %err, "Announcement handle lookup failed");
                return;
            }
        };

        match self
            .ports
            .gateway
            .delete_announcement(channel, &message_id)
            .await
        {
            Ok(()) => tracing::debug!(%round, %channel, message_id = %message_id, "Announcement deleted"),
            Err(GiftswapError::AnnouncementNotFound { .. }) => {
                tracing::debug!(%round, %channel, message_id = %message_id, "Announcement already gone");
            }
            Err(err) => tracing::warn!(
                %round, %channel, message_id = %message_id, error = %err,
                "Announcement delete failed"
            ),
        }

        if let Err(err) = self.ports.announcements.clear(key).await {
            tracing::warn!(%round, key = %key, error = %err, "Announcement handle clear failed");
        }
    }

    async fn announce_insufficient(
        &self,
        round: RoundId,
        channel: &ChannelRef,
        count: usize,
    ) -> EndOutcome {
        tracing::info!(%round, participants = count, "Too few participants, skipping pairing");
        let notice = WindowNotice::InsufficientParticipants { round, count };
        if let Err(err) = self.ports.gateway.broadcast(channel, &notice).await {
            tracing::warn!(%round, %channel, error = %err, "Closing broadcast failed");
        }
        EndOutcome::InsufficientParticipants { round, count }
    }

    async fn pair_and_notify(
        &self,
        round: RoundId,
        participants: &[Participant],
        gift_date: &str,
    ) -> Result<EndOutcome> {
        let outcome = {
            let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
            self.driver.run(participants, &mut *rng)?
        };
        verify_derangement(participants, &outcome.matching)?;

        tracing::info!(
            %round,
            pairs = outcome.matching.len(),
            attempts = outcome.attempts,
            digest = %assignment_digest_hex(round, &outcome.matching),
            "Participants paired"
        );

        let (delivered, failed) = self
            .dispatch_assignments(round, &outcome.matching, gift_date)
            .await;

        Ok(EndOutcome::Paired {
            round,
            pairs: outcome.matching.len(),
            attempts: outcome.attempts,
            delivered,
            failed,
        })
    }

    /// Send every giver their notice concurrently. Returns
    /// `(delivered, failed)`; one failure never stops the others.
    async fn dispatch_assignments(
        &self,
        round: RoundId,
        matching: &Matching,
        gift_date: &str,
    ) -> (usize, usize) {
        let mut sends = JoinSet::new();
        for pair in matching {
            let gateway = Arc::clone(&self.ports.gateway);
            let recipient = pair.giver.id.clone();
            let notice = AssignmentNotice::for_match(round, pair, gift_date);
            sends.spawn(async move {
                let result = gateway.send_direct(&recipient, &notice).await;
                (recipient, result)
            });
        }

        let (mut delivered, mut failed) = (0, 0);
        while let Some(joined) = sends.join_next().await {
            match joined {
                Ok((_, Ok(()))) => delivered += 1,
                Ok((recipient, Err(err))) => {
                    failed += 1;
                    tracing::warn!(%round, %recipient, error = %err, "Assignment notice failed");
                }
                Err(err) => {
                    failed += 1;
                    tracing::warn!(%round, error = %err, "Assignment notice task failed");
                }
            }
        }
        (delivered, failed)
    }

    async fn close_malformed(self: &Arc<Self>, err: &GiftswapError) -> TickOutcome {
        let Some(_permit) = self.run_guard.try_acquire() else {
            return TickOutcome::Busy;
        };
        self.scheduler.stop();
        let round = RoundId::new();
        tracing::error!(%round, error = %err, "Malformed signup deadline, closing window");
        self.reset_window(round).await;
        self.set_phase(WindowPhase::Inactive);
        TickOutcome::MalformedDeadline
    }

    async fn reset_window(&self, round: RoundId) -> bool {
        match self.ports.windows.save(&SignupWindow::inactive()).await {
            Ok(()) => true,
            Err(err) => {
                tracing::error!(%round, error = %err, "Failed to reset signup window");
                false
            }
        }
    }

    /// The first retry tick fires one full period from now.
    fn rearm_after_failure(self: &Arc<Self>, err: &GiftswapError) {
        tracing::error!(error = %err, "Ending failed before any side effect, window stays active");
        self.set_phase(WindowPhase::Active);
        self.arm_scheduler(self.config.tick_interval);
    }

    fn arm_scheduler(self: &Arc<Self>, first_tick_in: Duration) {
        let weak = Arc::downgrade(self);
        let period = self.config.tick_interval;
        self.scheduler.start_after(first_tick_in, period, move || {
            let weak = weak.clone();
            async move {
                if let Some(controller) = weak.upgrade() {
                    controller.check_deadline().await;
                }
            }
        });
    }

    fn set_phase(&self, phase: WindowPhase) {
        let mut slot = self.phase_slot();
        let from = *slot;
        if from != phase {
            tracing::debug!(%from, to = %phase, "Window phase changed");
            *slot = phase;
        }
    }

    fn phase_slot(&self) -> MutexGuard<'_, WindowPhase> {
        self.phase.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for LifecycleController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LifecycleController")
            .field("config", &self.config)
            .field("phase", &self.phase())
            .field("scheduler", &self.scheduler)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_messages() {
        let round = RoundId::new();
        let clean = EndOutcome::Paired {
            round,
            pairs: 4,
            attempts: 2,
            delivered: 4,
            failed: 0,
        };
        assert!(clean.to_string().contains("4 participants were paired and notified"));

        let partial = EndOutcome::Paired {
            round,
            pairs: 4,
            attempts: 1,
            delivered: 3,
            failed: 1,
        };
        assert!(partial.to_string().contains("1 notification(s)"));

        let short = EndOutcome::InsufficientParticipants { round, count: 1 };
        assert_eq!(
            short.to_string(),
            GiftswapError::InsufficientParticipants { count: 1 }.user_message()
        );
        assert_eq!(short.round(), round);
    }
}
