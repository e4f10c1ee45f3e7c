//! The injectable time source.
//!
//! Every TTL comparison in the core reads "now" through a [`Clock`]
//! rather than calling `Instant::now()` at the call site. Production
//! code injects [`SystemClock`]; tests inject [`ManualClock`] and
//! advance it explicitly, so expiry scenarios run deterministically
//! without sleeping.

use std::sync::Mutex;
use std::time::{Duration, Instant};

/// A monotonic time source.
///
/// Implementations must be cheap to call — `now()` sits on the hot
/// path of every invite transition.
pub trait Clock: Send + Sync + 'static {
    /// The current monotonic instant.
    fn now(&self) -> Instant;
}

/// The real clock. Delegates to `Instant::now()`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to. For tests.
///
/// Starts at the instant it was created and advances via
/// [`advance`](Self::advance).
#[derive(Debug)]
pub struct ManualClock {
    current: Mutex<Instant>,
}

impl ManualClock {
    /// Creates a manual clock frozen at the current instant.
    pub fn new() -> Self {
        Self {
            current: Mutex::new(Instant::now()),
        }
    }

    /// Moves the clock forward by `delta`.
    pub fn advance(&self, delta: Duration) {
        let mut current = self.current.lock().expect("clock lock poisoned");
        *current += delta;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.current.lock().expect("clock lock poisoned")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_is_frozen_until_advanced() {
        let clock = ManualClock::new();
        let a = clock.now();
        let b = clock.now();
        assert_eq!(a, b, "manual clock must not move on its own");
    }

    #[test]
    fn test_manual_clock_advance_moves_now() {
        let clock = ManualClock::new();
        let before = clock.now();
        clock.advance(Duration::from_millis(150));
        assert_eq!(clock.now() - before, Duration::from_millis(150));
    }

    #[test]
    fn test_system_clock_is_monotonic() {
        let clock = SystemClock;
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }
}
