// kernel/src/kernel/sync/mod.rs
//! Synchronization primitives the boundary owns.

use core::sync::atomic::{AtomicU32, Ordering};

/// Counting semaphore.
///
/// Used as the child-to-parent exit notification: the child raises it once
/// after writing its exit status, the parent lowers it in `wait`. `up` is a
/// release and a successful `down` an acquire, so everything written before
/// the raise is visible after the wait. That is the sole happens-before
/// edge between a child's termination and its parent.
pub struct Semaphore {
    permits: AtomicU32,
}

impl Semaphore {
    /// Creates a semaphore holding `permits` permits.
    #[must_use]
    pub const fn new(permits: u32) -> Self {
        Self {
            permits: AtomicU32::new(permits),
        }
    }

    /// Adds one permit, waking at most one spinner.
    pub fn up(&self) {
        self.permits.fetch_add(1, Ordering::Release);
    }

    /// Takes one permit, spinning until one is available.
    pub fn down(&self) {
        loop {
            if self.try_down() {
                return;
            }
            core::hint::spin_loop();
        }
    }

    /// Takes one permit without blocking. `false` if none are available.
    pub fn try_down(&self) -> bool {
        let mut current = self.permits.load(Ordering::Relaxed);
        while current > 0 {
            match self.permits.compare_exchange_weak(
                current,
                current - 1,
                Ordering::Acquire,
                Ordering::Relaxed,
            ) {
                Ok(_) => return true,
                Err(observed) => current = observed,
            }
        }
        false
    }
}
