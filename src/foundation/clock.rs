use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Wall-clock source used to anchor playback sessions.
///
/// Values are seconds on an arbitrary, monotonically non-decreasing timeline.
pub trait Clock: Send + Sync {
    /// Current time in seconds.
    fn now_secs(&self) -> f64;
}

/// Clock backed by [`Instant`], zeroed at construction.
#[derive(Debug, Clone)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_secs(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// Hand-driven clock for tests and offline hosts.
///
/// Clones share the same time value.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    bits: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new(start_secs: f64) -> Self {
        Self {
            bits: Arc::new(AtomicU64::new(start_secs.to_bits())),
        }
    }

    pub fn set(&self, secs: f64) {
        self.bits.store(secs.to_bits(), Ordering::SeqCst);
    }

    /// Move time forward; negative deltas are ignored.
    pub fn advance(&self, delta_secs: f64) {
        if !(delta_secs > 0.0) {
            return;
        }
        let now = self.now_secs();
        self.set(now + delta_secs);
    }
}

impl Clock for ManualClock {
    fn now_secs(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::SeqCst))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/clock.rs"]
mod tests;
