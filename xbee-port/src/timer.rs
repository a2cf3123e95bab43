//! Timer adapter.
//!
//! Coarse and fine elapsed-time readings for the portable core's
//! timeouts. Both come from a single [`TickSource`], so a second reading
//! always agrees with the millisecond reading taken from the same tick.

use common::time::{wrap_millis, wrap_seconds};

use crate::hal::timer::TickSource;

/// One tick reading in both resolutions.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Timestamp {
    /// Whole seconds, wrapping at `u32::MAX`.
    pub seconds: u32,
    /// Milliseconds, wrapping at `u32::MAX`.
    pub millis: u32,
}

/// Elapsed-time queries over a tick source.
#[derive(Debug)]
pub struct TimerAdapter<T> {
    clock: T,
}

impl<T: TickSource> TimerAdapter<T> {
    pub const fn new(clock: T) -> Self {
        Self { clock }
    }

    /// Seconds since the tick source's reference point.
    pub fn seconds(&self) -> u32 {
        self.now().seconds
    }

    /// Milliseconds since the tick source's reference point.
    pub fn milliseconds(&self) -> u32 {
        self.now().millis
    }

    /// Both readings from a single tick.
    pub fn now(&self) -> Timestamp {
        let ms = self.clock.now_ms();
        Timestamp {
            seconds: wrap_seconds(ms),
            millis: wrap_millis(ms),
        }
    }

    pub fn clock(&self) -> &T {
        &self.clock
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StepClock;

    #[test]
    fn readings_follow_the_tick_rate() {
        let timer = TimerAdapter::new(StepClock::new(100, 0));
        timer.clock().advance(250);
        assert_eq!(timer.milliseconds(), 2_500);
        assert_eq!(timer.seconds(), 2);
    }

    #[test]
    fn seconds_and_millis_agree() {
        let timer = TimerAdapter::new(StepClock::new(1_000_000, 0));
        timer.clock().advance(7_999_999);
        let now = timer.now();
        assert_eq!(now.millis, 7_999);
        assert_eq!(now.seconds, 7);
        assert_eq!(now.seconds, now.millis / 1_000);
    }

    #[test]
    fn readings_never_decrease() {
        let timer = TimerAdapter::new(StepClock::new(1_000, 3));
        let mut last = timer.now();
        for _ in 0..2_000 {
            let now = timer.now();
            assert!(now.millis >= last.millis);
            assert!(now.seconds >= last.seconds);
            last = now;
        }
    }

    #[test]
    fn millis_wrap_at_32_bits() {
        let timer = TimerAdapter::new(StepClock::new(1_000, 0));
        timer.clock().advance(u64::from(u32::MAX) + 6);
        assert_eq!(timer.milliseconds(), 5);
        assert_eq!(timer.seconds(), ((u64::from(u32::MAX) + 6) / 1_000) as u32);
    }
}
