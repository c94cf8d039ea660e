//! Run Guard
//!
//! Marks a simulation as running for the duration of a detection or
//! ordering run. While the flag is set every mutation and analysis command
//! is rejected with `Busy`, so the graph a run reads cannot change under it.
//!
//! The flag is cleared when the guard is dropped, including when an observer
//! panics out of a callback.

use std::sync::atomic::{AtomicBool, Ordering};

/// Guard that clears the running flag when dropped.
pub struct RunGuard<'a> {
    running: &'a AtomicBool,
}

impl<'a> RunGuard<'a> {
    /// Claim the flag. Returns `None` if a run already holds it.
    pub fn acquire(running: &'a AtomicBool) -> Option<Self> {
        running
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .ok()
            .map(|_| Self { running })
    }

    /// Check whether some run holds the flag.
    pub fn is_held(running: &AtomicBool) -> bool {
        running.load(Ordering::Acquire)
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        let was_running = self.running.swap(false, Ordering::Release);
        debug_assert!(was_running, "RunGuard dropped without holding the flag");
    }
}
