//! At-most-one guard for the end-of-window workflow.
//!
//! A manual "end now" can race an automatic deadline tick. Whoever wins the
//! compare-and-swap holds a [`RunPermit`]; everyone else is refused until the
//! permit is dropped.

use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Default)]
pub struct RunGuard {
    in_progress: AtomicBool,
}

/// Proof of holding the guard. Releases it on drop, including on early
/// return and on panic unwinding.
#[derive(Debug)]
#[must_use = "the guard is released as soon as the permit is dropped"]
pub struct RunPermit<'a> {
    guard: &'a RunGuard,
}

impl RunGuard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the guard if nobody holds it.
    pub fn try_acquire(&self) -> Option<RunPermit<'_>> {
        self.in_progress
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| RunPermit { guard: self })
    }

    /// Whether a permit is currently outstanding.
    #[must_use]
    pub fn is_held(&self) -> bool {
        self.in_progress.load(Ordering::Acquire)
    }
}

impl Drop for RunPermit<'_> {
    fn drop(&mut self) {
        self.guard.in_progress.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn first_acquire_ok() {
        let guard = RunGuard::new();
        let permit = guard.try_acquire();
        assert!(permit.is_some());
        assert!(guard.is_held());
    }

    #[test]
    fn second_acquire_refused_until_release() {
        let guard = RunGuard::new();
        let permit = guard.try_acquire().unwrap();
        assert!(guard.try_acquire().is_none());

        drop(permit);
        assert!(!guard.is_held());
        assert!(guard.try_acquire().is_some());
    }

    #[test]
    fn exactly_one_thread_wins() {
        let guard = Arc::new(RunGuard::new());
        let start = Arc::new(std::sync::Barrier::new(8));
        let tried = Arc::new(std::sync::Barrier::new(8));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let guard = Arc::clone(&guard);
                let start = Arc::clone(&start);
                let tried = Arc::clone(&tried);
                std::thread::spawn(move || {
                    start.wait();
                    let permit = guard.try_acquire();
                    let won = permit.is_some();
                    // Hold the permit until every thread has tried.
                    tried.wait();
                    won
                })
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();
        assert_eq!(winners, 1);
    }
}
