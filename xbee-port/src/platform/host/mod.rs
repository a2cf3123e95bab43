//! Hosted platform binding.
//!
//! Runs the port layer in an ordinary std process: time comes from the
//! monotonic clock and the UARTs are loopback jumpers. Useful for
//! running the portable core against itself.

use std::time::Instant;

use core::ffi::CStr;

use super::Platform;
use crate::config::PortConfig;
use crate::hal::serial::PinAssignment;
use crate::hal::timer::TickSource;
use crate::peripheral::loopback::LoopbackUart;

static NAMES: [&CStr; 3] = [c"UART0", c"UART1", c"UART2"];

/// Microsecond ticks since the clock was created.
#[derive(Debug, Copy, Clone)]
pub struct HostClock {
    origin: Instant,
}

impl HostClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for HostClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TickSource for HostClock {
    fn ticks(&self) -> u64 {
        u64::try_from(self.origin.elapsed().as_micros()).unwrap_or(u64::MAX)
    }

    fn tick_rate_hz(&self) -> u32 {
        1_000_000
    }
}

pub struct HostPlatform;

impl Platform for HostPlatform {
    type Uart = LoopbackUart;
    type Clock = HostClock;

    fn name() -> &'static str {
        "Host (loopback)"
    }

    unsafe fn early_init() {}

    unsafe fn clock() -> HostClock {
        HostClock::new()
    }

    unsafe fn uart() -> LoopbackUart {
        LoopbackUart::new(&NAMES)
    }

    fn default_port_config() -> PortConfig {
        PortConfig::new(2, PinAssignment::tx_rx(17, 16))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_clock_is_monotonic() {
        let clock = HostClock::new();
        let a = clock.ticks();
        let b = clock.ticks();
        assert!(b >= a);
    }
}
