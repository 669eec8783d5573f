use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// A monotonic time source, in milliseconds from an arbitrary origin.
///
/// Successive reads of the same clock are non-decreasing within a process
/// lifetime. The clock is injected into the engine (never read from a hidden
/// global), so temporal behavior can be pinned down in tests with
/// [`ManualClock`].
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> u64;
}

/// Production clock wrapping [`std::time::Instant`], anchored at
/// construction.
#[derive(Debug)]
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
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

/// A manually advanced clock for tests, simulations, and demos.
///
/// Shared by `Arc`, advanced from the driving code. It never runs backwards:
/// [`ManualClock::set_ms`] ignores values earlier than the current reading.
#[derive(Debug, Default)]
pub struct ManualClock {
    now_ms: AtomicU64,
}

impl ManualClock {
    pub fn new(now_ms: u64) -> Self {
        Self {
            now_ms: AtomicU64::new(now_ms),
        }
    }

    /// Moves the clock forward to `now_ms`; a reading from the past is
    /// ignored.
    pub fn set_ms(&self, now_ms: u64) {
        self.now_ms.fetch_max(now_ms, Ordering::SeqCst);
    }

    /// Advances the clock by `delta_ms` and returns the new reading.
    pub fn advance(&self, delta_ms: u64) -> u64 {
        self.now_ms
            .fetch_add(delta_ms, Ordering::SeqCst)
            .saturating_add(delta_ms)
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now_ms.load(Ordering::SeqCst)
    }
}
