//! Single-pass guard with a bounded catch-up.

use std::sync::atomic::{AtomicBool, Ordering};

/// Keeps driver passes from overlapping within one process.
///
/// A request that arrives while a pass runs is not started; it marks the
/// running pass as having "run long", and that pass performs one catch-up
/// pass before releasing the guard.
#[derive(Debug, Default)]
pub struct PassGuard {
    in_progress: AtomicBool,
    ran_long: AtomicBool,
}

impl PassGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the guard. Returns `false` and records the request when a pass
    /// is already running.
    pub fn try_begin(&self) -> bool {
        if self
            .in_progress
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            self.ran_long.store(false, Ordering::Release);
            true
        } else {
            self.ran_long.store(true, Ordering::Release);
            false
        }
    }

    /// Consume the catch-up request recorded during the current pass.
    pub fn take_catch_up(&self) -> bool {
        self.ran_long.swap(false, Ordering::AcqRel)
    }

    /// Release the guard.
    pub fn finish(&self) {
        self.in_progress.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_claim_is_refused_and_requests_catch_up() {
        let guard = PassGuard::new();
        assert!(guard.try_begin());
        assert!(!guard.try_begin());
        assert!(!guard.try_begin());

        assert!(guard.take_catch_up());
        assert!(!guard.take_catch_up(), "catch-up is consumed once");

        guard.finish();
        assert!(guard.try_begin(), "finish releases the guard");
    }

    #[test]
    fn quiet_pass_needs_no_catch_up() {
        let guard = PassGuard::new();
        assert!(guard.try_begin());
        assert!(!guard.take_catch_up());
        guard.finish();
        assert!(guard.try_begin(), "guard is reusable after finish");
    }
}
