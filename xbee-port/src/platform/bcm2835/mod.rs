//! BCM2835 (Raspberry Pi 1/Zero) platform binding.
//!
//! The XBee sits on UART0, GPIO14 (TX) and GPIO15 (RX); timing comes
//! from the 1MHz system timer.

mod gpio;
mod timer;
mod uart;

pub use timer::SystemTimer;
pub use uart::Bcm2835Uart;

use super::Platform;
use crate::config::PortConfig;
use crate::hal::serial::PinAssignment;

pub const PERIPHERAL_BASE: usize = 0x2000_0000;

pub struct Bcm2835Platform;

impl Platform for Bcm2835Platform {
    type Uart = Bcm2835Uart;
    type Clock = SystemTimer;

    fn name() -> &'static str {
        "BCM2835 (Raspberry Pi 1/Zero)"
    }

    unsafe fn early_init() {
        // The system timer free-runs from reset and UART0 is brought up
        // on open; nothing to prepare.
    }

    unsafe fn clock() -> SystemTimer {
        unsafe { SystemTimer::new() }
    }

    unsafe fn uart() -> Bcm2835Uart {
        unsafe { Bcm2835Uart::new() }
    }

    fn default_port_config() -> PortConfig {
        PortConfig::new(0, PinAssignment::tx_rx(14, 15))
    }
}
