//! # giftswap-lifecycle
//!
//! **Window Plane**: signup-window persistence, the one-second deadline
//! scheduler and the end-of-window workflow.
//!
//! ## Architecture
//!
//! The [`LifecycleController`] talks to the outside world only through the
//! [`ports`] traits, so the same workflow runs against a chat platform, a
//! database or the in-memory doubles in [`memory`].
//!
//! ```text
//! ┌───────────┐  tick   ┌────────────┐  now > deadline  ┌────────────┐
//! │ Scheduler │───────▶│  ACTIVE    │─────────────────▶│  ENDING    │
//! └───────────┘         │ (persisted)│                  │ pair, send │
//!       ▲               └────────────┘                  └─────┬──────┘
//!       │ resume()            ▲                               │ reset
//!       │                     │ open_window()                 ▼
//!       └─────────────── process start                  ┌────────────┐
//!                                                      │  INACTIVE  │
//!                                                      └────────────┘
//! ```
//!
//! ## Guarantees
//!
//! - At most one end-of-window run at a time ([`RunGuard`])
//! - The scheduler never fires after the window has been reset
//! - One failed direct notice never blocks the others

pub mod controller;
pub mod file_store;
pub mod memory;
pub mod ports;
pub mod run_guard;
pub mod scheduler;

pub use controller::{EndOutcome, LifecycleController, LifecyclePorts, TickOutcome};
pub use file_store::JsonFileWindowStore;
pub use memory::{ManualClock, MemoryAnnouncementStore, MemoryParticipantStore, MemoryWindowStore};
pub use ports::{
    AnnouncementStore, Clock, NotificationGateway, ParticipantStore, SystemClock, WindowStore,
};
pub use run_guard::{RunGuard, RunPermit};
pub use scheduler::Scheduler;
