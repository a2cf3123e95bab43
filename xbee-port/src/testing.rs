//! Test fixtures shared by the unit tests.

use core::ffi::CStr;
use core::sync::atomic::{AtomicU64, Ordering};

use crate::config::PortConfig;
use crate::hal::serial::PinAssignment;
use crate::hal::timer::TickSource;
use crate::peripheral::loopback::LoopbackUart;
use crate::serial::SerialAdapter;

/// A clock that moves `step` ticks every time it is read.
///
/// With a non-zero step, bounded waits finish after a known number of
/// polls instead of real time.
#[derive(Debug)]
pub struct StepClock {
    rate_hz: u32,
    step: u64,
    now: AtomicU64,
}

impl StepClock {
    pub fn new(rate_hz: u32, step: u64) -> Self {
        Self {
            rate_hz,
            step,
            now: AtomicU64::new(0),
        }
    }

    pub fn advance(&self, ticks: u64) {
        self.now.fetch_add(ticks, Ordering::Relaxed);
    }
}

impl TickSource for StepClock {
    fn ticks(&self) -> u64 {
        self.now.fetch_add(self.step, Ordering::Relaxed)
    }

    fn tick_rate_hz(&self) -> u32 {
        self.rate_hz
    }
}

pub static PORT_NAMES: [&CStr; 3] = [c"UART0", c"UART1", c"UART2"];

/// Loopback port on UART2, GPIO17/16, like a typical XBee carrier board.
pub fn port_config() -> PortConfig {
    PortConfig::new(2, PinAssignment::tx_rx(17, 16))
}

/// Adapter over three loopback UARTs and a 1 kHz clock advancing one
/// tick per read.
pub fn loopback_adapter() -> SerialAdapter<LoopbackUart, StepClock> {
    SerialAdapter::new(
        LoopbackUart::new(&PORT_NAMES),
        StepClock::new(1_000, 1),
        port_config(),
    )
}
