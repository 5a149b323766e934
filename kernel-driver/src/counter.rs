//! Process-wide count of successful opens. Diagnostics only.

use core::sync::atomic::{AtomicU64, Ordering};

pub struct OpenCounter {
    count: AtomicU64,
}

impl Default for OpenCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl OpenCounter {
    pub const fn new() -> Self {
        Self { count: AtomicU64::new(0) }
    }

    /// Record one more open; returns the new total.
    pub fn increment(&self) -> u64 {
        self.count.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn get(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }
}
