//! Timer Hardware Abstraction Layer.
//!
//! The port layer only needs a free-running counter: the timer adapter
//! derives its readings from it, and the serial adapter uses it to
//! bound its waits.

use common::time::{millis_to_ticks, ticks_to_millis};

/// Free-running tick counter.
///
/// The counter must be monotonic; it starts at an arbitrary point.
pub trait TickSource {
    /// Current counter value.
    fn ticks(&self) -> u64;

    /// Counter frequency in Hz.
    fn tick_rate_hz(&self) -> u32;

    /// Elapsed milliseconds since the counter's reference point.
    fn now_ms(&self) -> u64 {
        ticks_to_millis(self.ticks(), self.tick_rate_hz())
    }
}

impl<T: TickSource + ?Sized> TickSource for &T {
    fn ticks(&self) -> u64 {
        (**self).ticks()
    }

    fn tick_rate_hz(&self) -> u32 {
        (**self).tick_rate_hz()
    }
}

/// A point in tick time after which a bounded wait gives up.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Deadline {
    at: u64,
}

impl Deadline {
    /// Deadline `timeout_ms` from now on `clock`.
    pub fn after<T: TickSource + ?Sized>(clock: &T, timeout_ms: u32) -> Self {
        let span = millis_to_ticks(timeout_ms, clock.tick_rate_hz());
        Self {
            at: clock.ticks().saturating_add(span),
        }
    }

    /// Whether the deadline has passed.
    pub fn expired<T: TickSource + ?Sized>(&self, clock: &T) -> bool {
        clock.ticks() >= self.at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StepClock;

    #[test]
    fn deadline_expires_after_timeout() {
        let clock = StepClock::new(1_000, 0);
        let deadline = Deadline::after(&clock, 10);
        assert!(!deadline.expired(&clock));

        clock.advance(9);
        assert!(!deadline.expired(&clock));

        clock.advance(1);
        assert!(deadline.expired(&clock));
    }

    #[test]
    fn zero_timeout_is_already_expired() {
        let clock = StepClock::new(1_000, 0);
        assert!(Deadline::after(&clock, 0).expired(&clock));
    }

    #[test]
    fn now_ms_scales_by_rate() {
        let clock = StepClock::new(1_000_000, 0);
        clock.advance(2_500_000);
        assert_eq!(clock.now_ms(), 2_500);
    }
}
