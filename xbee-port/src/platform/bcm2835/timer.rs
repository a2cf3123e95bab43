//! BCM2835 System Timer
//!
//! The BCM2835 has a 64-bit free-running counter at 1MHz. The port
//! layer only reads it; the compare channels are left to the host
//! application.

use crate::hal::timer::TickSource;
use core::ptr::read_volatile;

/// System timer base address.
pub const TIMER_BASE: usize = super::PERIPHERAL_BASE + 0x3000;

/// Counter frequency.
pub const TIMER_HZ: u32 = 1_000_000;

/// Memory-mapped counter registers.
#[repr(C)]
struct Registers {
    _cs: u32,
    clo: u32,
    chi: u32,
}

#[inline(always)]
fn regs() -> *const Registers {
    TIMER_BASE as *const Registers
}

/// Read the 64-bit free-running counter.
pub fn read_counter() -> u64 {
    unsafe {
        // Read high word first for consistency
        let hi1 = read_volatile(&raw const (*regs()).chi);
        let lo = read_volatile(&raw const (*regs()).clo);
        let hi2 = read_volatile(&raw const (*regs()).chi);

        // If high word changed, re-read low word
        let (hi, lo) = if hi1 != hi2 {
            (hi2, read_volatile(&raw const (*regs()).clo))
        } else {
            (hi1, lo)
        };

        ((hi as u64) << 32) | (lo as u64)
    }
}

/// BCM2835 system timer as a tick source.
#[derive(Debug, Copy, Clone)]
pub struct SystemTimer;

impl SystemTimer {
    /// # Safety
    ///
    /// Timer registers must be properly mapped.
    pub const unsafe fn new() -> Self {
        Self
    }
}

impl TickSource for SystemTimer {
    fn ticks(&self) -> u64 {
        read_counter()
    }

    fn tick_rate_hz(&self) -> u32 {
        TIMER_HZ
    }
}
