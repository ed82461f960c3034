use std::time::{Duration, Instant};

/// Utility for keeping track of the time it took to perform some operation.
/// Backed by a monotonic clock, so elapsed times are safe to report even if
/// the wall clock jumps mid-run.
pub struct Timer {
    start_time: Instant,
}

impl Timer {
    /// Create a new `Timer` starting now.
    pub fn start() -> Self {
        Self {
            start_time: Instant::now(),
        }
    }

    /// Reset internal timer to now.
    pub fn reset(&mut self) {
        self.start_time = Instant::now();
    }

    /// Time elapsed since the timer was created or last reset.
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}
