//! Tick and time unit conversions.

/// Milliseconds per second.
pub const MILLIS_PER_SECOND: u64 = 1_000;

/// Convert a tick count at `rate_hz` into whole milliseconds.
///
/// A zero rate yields zero rather than dividing by zero.
pub const fn ticks_to_millis(ticks: u64, rate_hz: u32) -> u64 {
    if rate_hz == 0 {
        return 0;
    }
    ((ticks as u128 * MILLIS_PER_SECOND as u128) / rate_hz as u128) as u64
}

/// Convert milliseconds into ticks at `rate_hz`, rounding up so a wait
/// never ends early.
pub const fn millis_to_ticks(ms: u32, rate_hz: u32) -> u64 {
    let scaled = ms as u128 * rate_hz as u128;
    scaled.div_ceil(MILLIS_PER_SECOND as u128) as u64
}

/// Truncate a millisecond count to the wrapping 32-bit timer value.
#[inline]
pub const fn wrap_millis(ms: u64) -> u32 {
    ms as u32
}

/// Whole seconds in a millisecond count, wrapping at 32 bits.
#[inline]
pub const fn wrap_seconds(ms: u64) -> u32 {
    (ms / MILLIS_PER_SECOND) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_common_tick_rates() {
        assert_eq!(ticks_to_millis(1_500_000, 1_000_000), 1_500);
        assert_eq!(ticks_to_millis(250, 100), 2_500);
        assert_eq!(ticks_to_millis(42, 1_000), 42);
        assert_eq!(ticks_to_millis(10, 0), 0);
    }

    #[test]
    fn wait_ticks_round_up() {
        assert_eq!(millis_to_ticks(10, 1_000), 10);
        assert_eq!(millis_to_ticks(10, 100), 1);
        assert_eq!(millis_to_ticks(1, 60), 1);
        assert_eq!(millis_to_ticks(10, 1_000_000), 10_000);
    }

    #[test]
    fn wrapping_views_share_one_reading() {
        let ms = u32::MAX as u64 + 1_234;
        assert_eq!(wrap_millis(ms), 1_233);
        assert_eq!(wrap_seconds(ms), (ms / 1_000) as u32);
    }
}
